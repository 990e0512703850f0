// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use knowgraph_core::Graph;
use serde::Deserialize;
use tracing::{error, info};

use crate::api::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateGraphRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /update_graph - Extract a knowledge graph from free text
///
/// Responds with the graph in the shape `cy.add(...)` accepts. Failures come
/// back as a JSON error body, never as a partial graph.
#[tracing::instrument(skip(state, payload))]
pub async fn update_graph(
    State(state): State<AppState>,
    payload: Result<Json<UpdateGraphRequest>, JsonRejection>,
) -> Result<Json<Graph>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    info!(text_len = request.text.len(), "Graph update requested");

    let graph = tokio::time::timeout(state.request_timeout, state.extractor.extract(&request.text))
        .await
        .map_err(|_| {
            error!(
                timeout_secs = state.request_timeout.as_secs(),
                "Graph extraction timed out"
            );
            ApiError::RequestTimeout(format!(
                "graph extraction did not finish within {}s",
                state.request_timeout.as_secs()
            ))
        })?
        .map_err(|err| {
            error!(kind = err.kind(), attempts = err.attempts(), "Graph extraction failed: {}", err);
            ApiError::from(err)
        })?;

    Ok(Json(graph))
}

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

pub mod graph;
pub mod health;
pub mod index;

pub use graph::{update_graph, UpdateGraphRequest};
pub use health::health_check;
pub use index::index;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use knowgraph_extract::{ExtractionError, GraphExtractor};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request timeout: {0}")]
    RequestTimeout(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RequestTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Extraction(ExtractionError::SchemaViolation { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Extraction(ExtractionError::Provider { .. }) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest(msg) => ErrorResponse {
                error: self.to_string(),
                kind: "bad_request",
                details: vec![msg.clone()],
                attempts: None,
            },
            ApiError::RequestTimeout(msg) => ErrorResponse {
                error: self.to_string(),
                kind: "timeout",
                details: vec![msg.clone()],
                attempts: None,
            },
            ApiError::Extraction(err) => ErrorResponse {
                error: err.to_string(),
                kind: err.kind(),
                details: err.details(),
                attempts: Some(err.attempts()),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
    details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<u32>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<GraphExtractor>,
    /// Deadline for one extraction, retries included
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(extractor: Arc<GraphExtractor>, request_timeout: Duration) -> Self {
        Self {
            extractor,
            request_timeout,
        }
    }
}

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

pub mod api;
pub mod config;
pub mod llm;

use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use knowgraph_extract::{ExtractorConfig, GraphExtractor};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{health_check, index, update_graph, AppState};
use config::{HttpServerConfig, LogFormat, ServerConfig};

/// Initialize tracing
pub fn init_tracing(format: LogFormat) {
    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "knowgraph_server=info,knowgraph_extract=info,tower_http=info".into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Application router: the page, the extraction endpoint and a health probe.
pub fn build_router(state: AppState, server: &HttpServerConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/update_graph", post(update_graph))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &HttpServerConfig) -> CorsLayer {
    if !server.enable_cors {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_origins.is_empty() {
        tracing::warn!("CORS: Allowing all origins. Set cors_origins to restrict.");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("CORS: Ignoring invalid origin {:?}", origin);
                None
            }
        })
        .collect();
    tracing::info!("CORS: Allowing origins: {:?}", server.cors_origins);
    cors.allow_origin(AllowOrigin::list(origins))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    init_tracing(config.server.log_format);

    tracing::info!("Starting Knowgraph Server");
    tracing::debug!("Configuration: {:#?}", config);

    config.validate()?;

    let client = llm::build_client(&config.llm)?;
    let extractor = Arc::new(GraphExtractor::with_config(
        client,
        ExtractorConfig {
            max_attempts: config.extraction.max_attempts,
        },
    ));
    tracing::info!(
        max_attempts = config.extraction.max_attempts,
        request_timeout_secs = config.server.request_timeout_secs,
        "Graph extractor ready"
    );

    let state = AppState::new(extractor, config.request_timeout());
    let app = build_router(state, &config.server);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

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

// End-to-end tests for the HTTP gateway against scripted extraction clients

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use knowgraph_extract::{
    CompletionRequest, ExtractionClient, ExtractorConfig, GraphExtractor, LLMError,
    MockExtractionClient,
};
use knowgraph_server::{api::AppState, build_router, config::HttpServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with(client: Arc<dyn ExtractionClient>, max_attempts: u32, timeout: Duration) -> Router {
    let extractor = GraphExtractor::with_config(client, ExtractorConfig { max_attempts });
    let state = AppState::new(Arc::new(extractor), timeout);
    build_router(state, &HttpServerConfig::default())
}

fn app(mock: &MockExtractionClient) -> Router {
    app_with(Arc::new(mock.clone()), 3, Duration::from_secs(5))
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/update_graph")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_alice_met_bob_in_paris() {
    let mock = MockExtractionClient::always(json!({
        "nodes": [
            {"data": {"id": "alice", "label": "Alice"}},
            {"data": {"id": "bob", "label": "Bob"}},
            {"data": {"id": "paris", "label": "Paris"}}
        ],
        "edges": [
            {"data": {"source": "alice", "target": "bob", "label": "met"}},
            {"data": {"source": "alice", "target": "paris", "label": "in"}}
        ]
    }));

    let response = app(&mock)
        .oneshot(post_json(r#"{"text": "Alice met Bob in Paris."}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({
            "nodes": [
                {"data": {"id": "alice", "label": "Alice"}},
                {"data": {"id": "bob", "label": "Bob"}},
                {"data": {"id": "paris", "label": "Paris"}}
            ],
            "edges": [
                {"data": {"source": "alice", "target": "bob", "label": "met"}},
                {"data": {"source": "alice", "target": "paris", "label": "in"}}
            ]
        })
    );
    assert_eq!(mock.requests()[0].messages[1].content, "Alice met Bob in Paris.");
}

#[tokio::test]
async fn test_empty_text_returns_empty_graph() {
    let mock = MockExtractionClient::always(json!({"nodes": [], "edges": []}));

    let response = app(&mock).oneshot(post_json(r#"{"text": ""}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"nodes": [], "edges": []}));
}

#[tokio::test]
async fn test_missing_text_defaults_to_empty() {
    let mock = MockExtractionClient::always(json!({"nodes": [], "edges": []}));

    let response = app(&mock).oneshot(post_json("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.requests()[0].messages[1].content, "");
}

#[tokio::test]
async fn test_ghost_edge_is_rejected() {
    let mock = MockExtractionClient::always(json!({
        "nodes": [{"data": {"id": "alice", "label": "Alice"}}],
        "edges": [{"data": {"source": "alice", "target": "ghost", "label": "saw"}}]
    }));

    let response = app(&mock)
        .oneshot(post_json(r#"{"text": "Alice saw a ghost."}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "schema_violation");
    assert_eq!(body["attempts"], 3);
    assert_eq!(body["details"], json!(["Target node ghost not found in nodes"]));
    assert!(body["error"].as_str().unwrap().contains("ghost"));
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let mock = MockExtractionClient::new();
    mock.push_error(LLMError::Unauthorized("invalid api key".to_string()));

    let response = app(&mock)
        .oneshot(post_json(r#"{"text": "Alice met Bob."}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "provider_error");
    assert_eq!(mock.call_count(), 1);
}

struct StalledClient;

#[async_trait]
impl ExtractionClient for StalledClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Value, LLMError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(json!({"nodes": [], "edges": []}))
    }

    fn provider(&self) -> &str {
        "stalled"
    }

    fn model_name(&self) -> &str {
        "stalled-model"
    }
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let app = app_with(Arc::new(StalledClient), 3, Duration::from_millis(50));

    let response = app
        .oneshot(post_json(r#"{"text": "Alice met Bob."}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(read_json(response).await["kind"], "timeout");
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let mock = MockExtractionClient::new();

    let response = app(&mock).oneshot(post_json("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["kind"], "bad_request");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_index_serves_page() {
    let mock = MockExtractionClient::new();

    let response = app(&mock)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("cytoscape"));
    assert!(page.contains("/update_graph"));
}

#[tokio::test]
async fn test_health_reports_provider() {
    let mock = MockExtractionClient::new();

    let response = app(&mock)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "mock");
    assert_eq!(body["max_attempts"], 3);
}

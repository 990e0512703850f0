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

//! Validating extractor
//!
//! Turns free text into a [`Graph`] by asking the model for one, checking the
//! answer, and re-asking with the validation errors until it passes or the
//! attempt budget runs out.
//!
//! ## Extraction Process
//!
//! 1. Build the conversation: fixed instruction + caller text
//! 2. Call the provider with the graph schema as a forced function call
//! 3. Decode the output and validate edge endpoints
//! 4. On failure, append the rejected output and the error list, go to 2

use knowgraph_core::{Graph, GraphValidationError, RawGraph};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::llm_client::{CompletionRequest, ExtractionClient, OutputSchema};
use crate::prompt;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration for the graph extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Total provider calls allowed per extraction, first try included
    pub max_attempts: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

pub struct GraphExtractor {
    client: Arc<dyn ExtractionClient>,
    config: ExtractorConfig,
    schema: OutputSchema,
}

impl GraphExtractor {
    pub fn new(client: Arc<dyn ExtractionClient>) -> Self {
        Self::with_config(client, ExtractorConfig::default())
    }

    pub fn with_config(client: Arc<dyn ExtractionClient>, config: ExtractorConfig) -> Self {
        Self {
            client,
            config,
            schema: prompt::graph_output_schema(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn client(&self) -> &dyn ExtractionClient {
        self.client.as_ref()
    }

    /// Extract a validated graph from `text`.
    ///
    /// Empty or whitespace-only text is sent as-is; whatever the model makes
    /// of it (normally an empty graph) is returned.
    #[tracing::instrument(
        skip(self, text),
        fields(text_len = text.len(), provider = self.client.provider(), model = self.client.model_name())
    )]
    pub async fn extract(&self, text: &str) -> Result<Graph, ExtractionError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut messages = prompt::initial_messages(text);
        let mut last_violation = GraphValidationError::new(Vec::new());

        for attempt in 1..=max_attempts {
            let request = CompletionRequest {
                messages: messages.clone(),
                schema: self.schema.clone(),
            };

            let raw = match self.client.complete(&request).await {
                Ok(raw) => raw,
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %err, "Provider call failed, retrying");
                    continue;
                }
                Err(err) if err.is_retryable() && !last_violation.is_empty() => {
                    // Out of attempts with a rejected answer on record
                    warn!(attempt, error = %err, "Provider call failed on final attempt");
                    return Err(ExtractionError::SchemaViolation {
                        attempts: attempt,
                        source: last_violation,
                    });
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Provider call failed, giving up");
                    return Err(ExtractionError::Provider {
                        attempts: attempt,
                        source: err,
                    });
                }
            };

            match decode_graph(&raw) {
                Ok(graph) => {
                    info!(
                        attempt,
                        nodes = graph.node_count(),
                        edges = graph.edge_count(),
                        "Extracted knowledge graph"
                    );
                    return Ok(graph);
                }
                Err(violation) => {
                    warn!(
                        attempt,
                        max_attempts,
                        errors = violation.len(),
                        "Model output failed graph validation"
                    );
                    debug!(%violation, "Validation detail");
                    messages.push(prompt::assistant_echo(&raw));
                    messages.push(prompt::correction_message(&violation));
                    last_violation = violation;
                }
            }
        }

        Err(ExtractionError::SchemaViolation {
            attempts: max_attempts,
            source: last_violation,
        })
    }
}

/// Shape-decode then validate. A shape mismatch is reported the same way as
/// dangling edges so the model gets to fix either.
fn decode_graph(raw: &Value) -> Result<Graph, GraphValidationError> {
    let candidate: RawGraph = serde_json::from_value(raw.clone()).map_err(|e| {
        GraphValidationError::new(vec![format!(
            "Output does not match the Graph schema: {}",
            e
        )])
    })?;
    Graph::try_from(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LLMError;
    use crate::mock::MockExtractionClient;
    use knowgraph_core::{Edge, Node};
    use serde_json::json;

    fn dangling(target: &str) -> Value {
        json!({
            "nodes": [{"data": {"id": "a", "label": "A"}}],
            "edges": [{"data": {"source": "a", "target": target, "label": "rel"}}]
        })
    }

    fn valid() -> Value {
        json!({
            "nodes": [
                {"data": {"id": "a", "label": "A"}},
                {"data": {"id": "x", "label": "X"}}
            ],
            "edges": [{"data": {"source": "a", "target": "x", "label": "rel"}}]
        })
    }

    fn extractor(mock: &MockExtractionClient, max_attempts: u32) -> GraphExtractor {
        GraphExtractor::with_config(Arc::new(mock.clone()), ExtractorConfig { max_attempts })
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mock = MockExtractionClient::always(dangling("ghost"));

        let err = extractor(&mock, 4).extract("text").await.unwrap_err();

        assert_eq!(mock.call_count(), 4);
        match err {
            ExtractionError::SchemaViolation { attempts, source } => {
                assert_eq!(attempts, 4);
                assert_eq!(source.errors, vec!["Target node ghost not found in nodes"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_attempt_sees_first_error() {
        let mock = MockExtractionClient::new();
        mock.push_response(dangling("x"));
        mock.push_response(valid());

        let graph = extractor(&mock, 3).extract("A relates to X").await.unwrap();

        let expected = Graph::new(
            vec![Node::new("a", "A"), Node::new("x", "X")],
            vec![Edge::new("a", "x", "rel")],
        )
        .unwrap();
        assert_eq!(graph, expected);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages.len(), 2);

        let retry = &requests[1].messages;
        assert_eq!(retry.len(), 4);
        assert_eq!(retry[2].role, "assistant");
        assert_eq!(serde_json::from_str::<Value>(&retry[2].content).unwrap(), dangling("x"));
        assert!(retry[3].content.contains("Target node x not found in nodes"));
    }

    #[tokio::test]
    async fn test_zero_nodes_is_valid() {
        let mock = MockExtractionClient::always(json!({"nodes": [], "edges": []}));

        let graph = extractor(&mock, 3).extract("Alice met Bob.").await.unwrap();

        assert!(graph.is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_still_calls_model() {
        let mock = MockExtractionClient::always(json!({"nodes": [], "edges": []}));

        let graph = extractor(&mock, 3).extract("   ").await.unwrap();

        assert!(graph.is_empty());
        assert_eq!(mock.requests()[0].messages[1].content, "   ");
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_fed_back() {
        let mock = MockExtractionClient::new();
        mock.push_response(json!({"nodes": [{"data": {"id": "a"}}], "edges": []}));
        mock.push_response(valid());

        extractor(&mock, 3).extract("text").await.unwrap();

        let retry = &mock.requests()[1].messages;
        assert!(retry[3].content.contains("does not match the Graph schema"));
        assert!(retry[3].content.contains("label"));
    }

    #[tokio::test]
    async fn test_fatal_provider_error_stops_immediately() {
        let mock = MockExtractionClient::always(valid());
        mock.push_error(LLMError::Unauthorized("bad key".to_string()));

        let err = extractor(&mock, 3).extract("text").await.unwrap_err();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(err.kind(), "provider_error");
        assert_eq!(err.attempts(), 1);
    }

    #[tokio::test]
    async fn test_transient_provider_error_is_retried() {
        let mock = MockExtractionClient::always(valid());
        mock.push_error(LLMError::RateLimitExceeded);

        let graph = extractor(&mock, 3).extract("text").await.unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(mock.call_count(), 2);
        // A provider failure adds nothing to the conversation
        assert_eq!(mock.requests()[1].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_on_last_attempt_surfaces() {
        let mock = MockExtractionClient::new();
        mock.push_error(LLMError::Timeout);
        mock.push_error(LLMError::Timeout);

        let err = extractor(&mock, 2).extract("text").await.unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Provider { attempts: 2, source: LLMError::Timeout }
        ));
    }

    #[tokio::test]
    async fn test_missing_lists_are_fed_back() {
        let mock = MockExtractionClient::new();
        mock.push_response(json!({}));
        mock.push_response(json!({"nodes": [{"data": {"id": "a", "label": "A"}}]}));
        mock.push_response(valid());

        let graph = extractor(&mock, 3).extract("text").await.unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(mock.call_count(), 3);
        let requests = mock.requests();
        assert!(requests[1].messages[3].content.contains("missing field `nodes`"));
        assert!(requests[2].messages[5].content.contains("missing field `edges`"));
    }

    #[tokio::test]
    async fn test_transient_error_after_violation_keeps_violation() {
        let mock = MockExtractionClient::new();
        mock.push_response(dangling("ghost"));
        mock.push_error(LLMError::Timeout);

        let err = extractor(&mock, 2).extract("text").await.unwrap_err();

        assert_eq!(mock.call_count(), 2);
        match err {
            ExtractionError::SchemaViolation { attempts, source } => {
                assert_eq!(attempts, 2);
                assert_eq!(source.errors, vec!["Target node ghost not found in nodes"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fatal_error_after_violation_is_provider_error() {
        let mock = MockExtractionClient::new();
        mock.push_response(dangling("ghost"));
        mock.push_error(LLMError::Unauthorized("revoked".to_string()));

        let err = extractor(&mock, 3).extract("text").await.unwrap_err();

        assert_eq!(err.kind(), "provider_error");
        assert_eq!(err.attempts(), 2);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_tries_once() {
        let mock = MockExtractionClient::always(valid());

        extractor(&mock, 0).extract("text").await.unwrap();

        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_graph_schema() {
        let mock = MockExtractionClient::always(valid());

        GraphExtractor::new(Arc::new(mock.clone()))
            .extract("text")
            .await
            .unwrap();

        let schema = &mock.requests()[0].schema;
        assert_eq!(schema.name, prompt::FUNCTION_NAME);
        assert_eq!(schema.parameters, Graph::json_schema());
    }
}

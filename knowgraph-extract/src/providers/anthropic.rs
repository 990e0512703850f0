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

//! Anthropic Messages API, forced tool use

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, send_json, ProviderSettings};
use crate::llm_client::{CompletionRequest, ExtractionClient, LLMError};

pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String, settings: ProviderSettings) -> Result<Self, LLMError> {
        Ok(Self {
            api_key,
            base_url: "https://api.anthropic.com/v1".to_string(),
            client: http_client(settings.timeout)?,
            settings,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .conversation()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        let mut body = json!({
            "model": self.settings.model,
            "max_tokens": 4096,
            "temperature": self.settings.temperature,
            "messages": messages,
            "tools": [{
                "name": request.schema.name,
                "description": request.schema.description,
                "input_schema": request.schema.parameters,
            }],
            "tool_choice": { "type": "tool", "name": request.schema.name },
        });
        if let Some(system) = request.system_prompt() {
            body["system"] = Value::String(system);
        }
        body
    }
}

#[async_trait]
impl ExtractionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError> {
        let body = self.build_body(request);

        let response_data = send_json(
            self.client
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&body),
        )
        .await?;

        debug!(
            model = %self.settings.model,
            stop_reason = ?response_data["stop_reason"].as_str(),
            input_tokens = ?response_data["usage"]["input_tokens"].as_u64(),
            output_tokens = ?response_data["usage"]["output_tokens"].as_u64(),
            "Anthropic completion received"
        );

        response_data["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|block| block["type"] == "tool_use")
                    .map(|block| block["input"].clone())
            })
            .ok_or_else(|| LLMError::InvalidResponse("Missing tool_use block".to_string()))
    }

    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{ChatMessage, OutputSchema};

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                ChatMessage::system("build a graph"),
                ChatMessage::user("Alice met Bob."),
                ChatMessage::assistant("{}"),
                ChatMessage::user("fix it"),
            ],
            schema: OutputSchema {
                name: "make_graph".to_string(),
                description: "Knowledge graph".to_string(),
                parameters: json!({"type": "object"}),
            },
        }
    }

    #[test]
    fn test_system_prompt_moves_out_of_messages() {
        let client =
            AnthropicClient::new("k".to_string(), ProviderSettings::new("claude-3-5-haiku-20241022"))
                .unwrap();
        let body = client.build_body(&request());

        assert_eq!(body["system"], "build a graph");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["tool_choice"]["name"], "make_graph");
    }

    #[tokio::test]
    async fn test_reads_tool_use_input() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "content": [
                {"type": "text", "text": "Building the graph."},
                {"type": "tool_use", "id": "toolu_1", "name": "make_graph",
                 "input": {"nodes": [], "edges": []}}
            ],
            "stop_reason": "tool_use"
        });
        server
            .mock("POST", "/messages")
            .match_header("x-api-key", "k")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = AnthropicClient::new("k".to_string(), ProviderSettings::new("claude"))
            .unwrap()
            .with_base_url(server.url());
        let value = client.complete(&request()).await.unwrap();
        assert_eq!(value, json!({"nodes": [], "edges": []}));
    }

    #[tokio::test]
    async fn test_missing_tool_use_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"text","text":"no"}]}"#)
            .create_async()
            .await;

        let client = AnthropicClient::new("k".to_string(), ProviderSettings::new("claude"))
            .unwrap()
            .with_base_url(server.url());
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }
}

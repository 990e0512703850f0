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

//! Extraction client abstraction
//!
//! A provider receives a conversation plus the JSON Schema the answer must
//! follow and returns the structured value the model produced. Whether that
//! value actually satisfies the schema is the extractor's business, not the
//! provider's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Trait for LLM clients that can answer with a value shaped by a schema
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Run one completion and return the raw structured output
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError>;

    /// Get provider name
    fn provider(&self) -> &str;

    /// Get model name
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

/// Target shape of a completion, exposed to the model as a function/tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub schema: OutputSchema,
}

impl CompletionRequest {
    /// Concatenated system messages, for providers that take the system
    /// prompt outside the message list.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.is_system())
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// Messages other than system ones, in order.
    pub fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_system())
    }
}

/// Errors from LLM providers
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("Provider rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider call timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LLMError {
    /// Map a non-success HTTP status and its body to an error
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LLMError::Unauthorized(body),
            429 => LLMError::RateLimitExceeded,
            code => LLMError::Api {
                status: code,
                message: body,
            },
        }
    }

    /// Transport errors, with timeouts and undecodable bodies split out
    pub fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else if err.is_decode() {
            LLMError::InvalidResponse(err.to_string())
        } else {
            LLMError::Http(err)
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    ///
    /// Credential problems and client errors other than 408/429 will fail
    /// the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            LLMError::Unauthorized(_) => false,
            LLMError::Api { status, .. } => !(400..500).contains(status) || *status == 408,
            LLMError::RateLimitExceeded
            | LLMError::InvalidResponse(_)
            | LLMError::Timeout
            | LLMError::Http(_)
            | LLMError::Json(_) => true,
        }
    }
}

/// Pull a JSON value out of free text the model may have wrapped in prose or
/// code fences.
pub fn extract_json_from_text(s: &str) -> Result<Value, LLMError> {
    let t = s.trim().trim_matches('\u{feff}');

    if let Ok(v) = serde_json::from_str::<Value>(t) {
        return Ok(v);
    }

    if let Some(start) = t.find("```json") {
        if let Some(end) = t[start + 7..].find("```") {
            let block = &t[start + 7..start + 7 + end];
            if let Ok(v) = serde_json::from_str::<Value>(block) {
                return Ok(v);
            }
        }
    }

    if let (Some(i), Some(j)) = (t.find('{'), t.rfind('}')) {
        if i < j {
            if let Ok(v) = serde_json::from_str::<Value>(&t[i..=j]) {
                return Ok(v);
            }
        }
    }

    Err(LLMError::InvalidResponse(
        "no valid JSON found in model output".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;

        assert!(matches!(
            LLMError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            LLMError::Unauthorized(_)
        ));
        assert!(matches!(
            LLMError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            LLMError::RateLimitExceeded
        ));
        assert!(matches!(
            LLMError::from_status(StatusCode::BAD_GATEWAY, "upstream".into()),
            LLMError::Api { status: 502, .. }
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(!LLMError::Unauthorized("bad key".into()).is_retryable());
        assert!(!LLMError::Api { status: 400, message: String::new() }.is_retryable());
        assert!(LLMError::Api { status: 408, message: String::new() }.is_retryable());
        assert!(LLMError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(LLMError::RateLimitExceeded.is_retryable());
        assert!(LLMError::Timeout.is_retryable());
        assert!(LLMError::InvalidResponse("empty".into()).is_retryable());
    }

    #[test]
    fn test_extract_json_from_fenced_text() {
        let text = "Here you go:\n```json\n{\"nodes\": [], \"edges\": []}\n```";
        assert_eq!(
            extract_json_from_text(text).unwrap(),
            json!({"nodes": [], "edges": []})
        );
    }

    #[test]
    fn test_extract_json_from_prose() {
        let text = "Sure! {\"nodes\": []} Hope that helps.";
        assert_eq!(extract_json_from_text(text).unwrap(), json!({"nodes": []}));
        assert!(extract_json_from_text("no json here").is_err());
    }

    #[test]
    fn test_system_prompt_split() {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system("be precise"),
                ChatMessage::user("Alice met Bob."),
            ],
            schema: OutputSchema {
                name: "make_graph".into(),
                description: String::new(),
                parameters: json!({}),
            },
        };

        assert_eq!(request.system_prompt().as_deref(), Some("be precise"));
        assert_eq!(request.conversation().count(), 1);
    }
}

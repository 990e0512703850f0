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

//! Scripted client for tests and offline runs

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::llm_client::{CompletionRequest, ExtractionClient, LLMError};

/// Replays queued responses in order and records every request it sees.
///
/// Once the queue is drained the fallback response (if any) is returned for
/// every further call.
#[derive(Clone, Default)]
pub struct MockExtractionClient {
    responses: Arc<Mutex<VecDeque<Result<Value, LLMError>>>>,
    fallback: Option<Value>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockExtractionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that answers every call with `response`.
    pub fn always(response: Value) -> Self {
        Self {
            fallback: Some(response),
            ..Self::default()
        }
    }

    pub fn push_response(&self, response: Value) {
        self.responses.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: LLMError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ExtractionClient for MockExtractionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError> {
        self.requests.lock().push(request.clone());

        if let Some(next) = self.responses.lock().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| LLMError::InvalidResponse("no scripted response left".to_string()))
    }

    fn provider(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

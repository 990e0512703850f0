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

use thiserror::Error;

/// A candidate graph failed referential validation.
///
/// Carries every violation, in edge order. The `Display` output is written for
/// two readers: a human looking at an HTTP error body, and the model being
/// asked to fix its previous answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.errors))]
pub struct GraphValidationError {
    pub errors: Vec<String>,
}

impl GraphValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// Individual violation messages.
    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn render(errors: &[String]) -> String {
    let noun = if errors.len() == 1 { "error" } else { "errors" };
    let mut out = format!("{} validation {} for Graph", errors.len(), noun);
    for message in errors {
        out.push_str("\n  - ");
        out.push_str(message);
    }
    out
}

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

//! Prompt text for graph extraction

use knowgraph_core::{schema::GRAPH_DESCRIPTION, Graph, GraphValidationError};

use crate::llm_client::{ChatMessage, OutputSchema};

/// Name of the function the model is asked to call.
pub const FUNCTION_NAME: &str = "make_graph";

pub const EXTRACTION_INSTRUCTION: &str = "You are an AI expert specializing in knowledge graph \
creation with the goal of capturing relationships based on a given input or request. Based on \
the user input in various forms such as paragraph, email, text files, and more, your task is to \
create a knowledge graph based on the input.

Rules:
- Every node label must be an unaltered word or phrase from the input.
- Every edge label must be a direct word or phrase from the input.
- Give every node a unique, human-readable id.
- Both source and target of an edge must be the id of an EXISTING node.";

/// Schema handed to the provider for every extraction call.
pub fn graph_output_schema() -> OutputSchema {
    OutputSchema {
        name: FUNCTION_NAME.to_string(),
        description: GRAPH_DESCRIPTION.to_string(),
        parameters: Graph::json_schema(),
    }
}

/// Opening conversation for a fresh extraction.
pub fn initial_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(EXTRACTION_INSTRUCTION),
        ChatMessage::user(text),
    ]
}

/// The rejected output, replayed as the model's own turn.
pub fn assistant_echo(raw: &serde_json::Value) -> ChatMessage {
    ChatMessage::assistant(raw.to_string())
}

/// Follow-up asking the model to fix exactly the reported problems.
pub fn correction_message(error: &GraphValidationError) -> ChatMessage {
    ChatMessage::user(format!(
        "Your previous response failed validation.\n\n{}\n\n\
         Correct exactly these errors and call `{}` again with the complete graph. \
         Keep everything that was already valid.",
        error, FUNCTION_NAME
    ))
}

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

//! JSON Schema for the graph wire shape
//!
//! Handed to providers as the function-call parameter schema so the model
//! answers in the same shape the front end consumes.

use serde_json::{json, Value};

use crate::graph::Graph;

pub const GRAPH_DESCRIPTION: &str = "Represents a knowledge graph based on the input. \
Format must be compatible with cy.add(data) for displaying the graph on the frontend.";

pub const EDGE_DESCRIPTION: &str = "both source and target must be the ID of an EXISTING node";

impl Graph {
    /// JSON Schema (draft 2020-12 subset) describing a serialized [`Graph`].
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "description": GRAPH_DESCRIPTION,
            "properties": {
                "nodes": {
                    "type": "array",
                    "description": "List of nodes in the knowledge graph",
                    "items": item_schema(node_schema()),
                },
                "edges": {
                    "type": "array",
                    "description": "List of edges in the knowledge graph",
                    "items": item_schema(edge_schema()),
                },
            },
            "required": ["nodes", "edges"],
        })
    }
}

fn item_schema(inner: Value) -> Value {
    json!({
        "type": "object",
        "properties": { "data": inner },
        "required": ["data"],
    })
}

fn node_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {
                "type": "string",
                "description": "Unique, human-readable ID for the node",
            },
            "label": {
                "type": "string",
                "description": "Unaltered word or phrase from the input",
            },
        },
        "required": ["id", "label"],
    })
}

fn edge_schema() -> Value {
    json!({
        "type": "object",
        "description": EDGE_DESCRIPTION,
        "properties": {
            "source": { "type": "string", "description": "ID of the source node" },
            "target": { "type": "string", "description": "ID of the target node" },
            "label": {
                "type": "string",
                "description": "Direct word or phrase from the input",
            },
        },
        "required": ["source", "target", "label"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mirrors_wire_shape() {
        let schema = Graph::json_schema();
        let node = &schema["properties"]["nodes"]["items"]["properties"]["data"];
        let edge = &schema["properties"]["edges"]["items"]["properties"]["data"];

        assert_eq!(node["required"], json!(["id", "label"]));
        assert_eq!(edge["required"], json!(["source", "target", "label"]));
        assert_eq!(edge["description"], EDGE_DESCRIPTION);
    }
}

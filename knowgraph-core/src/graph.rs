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

//! Graph data model
//!
//! Wire shape (what `cy.add(...)` consumes):
//!
//! ```json
//! {
//!   "nodes": [{"data": {"id": "alice", "label": "Alice"}}],
//!   "edges": [{"data": {"source": "alice", "target": "bob", "label": "met"}}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::GraphValidationError;

/// One-field envelope around a graph element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item<T> {
    pub data: T,
}

impl<T> Item<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> From<T> for Item<T> {
    fn from(data: T) -> Self {
        Self { data }
    }
}

/// An entity in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Unique, human-readable ID for the node
    pub id: String,
    /// Unaltered word or phrase from the input
    pub label: String,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A directed, labeled relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// ID of the source node
    pub source: String,
    /// ID of the target node
    pub target: String,
    /// Direct word or phrase from the input
    pub label: String,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }
}

/// Unvalidated graph, exactly as decoded from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGraph {
    pub nodes: Vec<Item<Node>>,
    pub edges: Vec<Item<Edge>>,
}

/// A knowledge graph whose edges all resolve to nodes in the same graph.
///
/// Duplicate node ids, self loops and cycles are allowed; only referential
/// existence is checked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawGraph")]
pub struct Graph {
    nodes: Vec<Item<Node>>,
    edges: Vec<Item<Edge>>,
}

impl Graph {
    /// Build a graph from bare nodes and edges, preserving order.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphValidationError> {
        Self::from_items(
            nodes.into_iter().map(Item::new).collect(),
            edges.into_iter().map(Item::new).collect(),
        )
    }

    /// Build a graph from elements already wrapped in their envelope.
    pub fn from_items(
        nodes: Vec<Item<Node>>,
        edges: Vec<Item<Edge>>,
    ) -> Result<Self, GraphValidationError> {
        let errors = dangling_endpoints(&nodes, &edges);
        if !errors.is_empty() {
            return Err(GraphValidationError::new(errors));
        }
        Ok(Self { nodes, edges })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Re-run referential validation.
    pub fn validate(&self) -> Result<(), GraphValidationError> {
        let errors = dangling_endpoints(&self.nodes, &self.edges);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GraphValidationError::new(errors))
        }
    }

    pub fn nodes(&self) -> &[Item<Node>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Item<Edge>] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Item<Node>>, Vec<Item<Edge>>) {
        (self.nodes, self.edges)
    }
}

impl TryFrom<RawGraph> for Graph {
    type Error = GraphValidationError;

    fn try_from(raw: RawGraph) -> Result<Self, Self::Error> {
        Self::from_items(raw.nodes, raw.edges)
    }
}

/// Every source/target that does not name a node, in edge order.
fn dangling_endpoints(nodes: &[Item<Node>], edges: &[Item<Edge>]) -> Vec<String> {
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.data.id.as_str()).collect();

    let mut errors = Vec::new();
    for edge in edges {
        if !node_ids.contains(edge.data.source.as_str()) {
            errors.push(format!(
                "Source node {} not found in nodes",
                edge.data.source
            ));
        }
        if !node_ids.contains(edge.data.target.as_str()) {
            errors.push(format!(
                "Target node {} not found in nodes",
                edge.data.target
            ));
        }
    }
    errors
}

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

//! Knowgraph Core
//!
//! The knowledge graph shape handed to the front end: nodes, labeled edges,
//! and the `data` envelope Cytoscape expects around every element.
//!
//! A [`Graph`] can only be obtained through validation, so holding one means
//! every edge endpoint names a node in the same graph.

pub mod error;
pub mod graph;
pub mod schema;

pub use error::GraphValidationError;
pub use graph::{Edge, Graph, Item, Node, RawGraph};

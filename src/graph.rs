// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! An undirected multigraph of the nodes of a power grid and the branches
//! between them.

mod creation;
mod cycles;
pub mod iterators;
mod mutation;
mod retrieval;
mod tmp_remove;
mod traversal;

#[cfg(test)]
pub(crate) mod test_utils;

pub use tmp_remove::TmpRemovedNodes;

use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// Nodes stored in an `UnGraph` are addressed with `NodeIndex`es.
///
/// `NodeIndexMap` stores the corresponding `NodeIndex` for every external
/// node id, so that nodes can be found from the ids used in the grid arrays.
pub(crate) type NodeIndexMap = HashMap<i64, NodeIndex>;

/// The connectivity of a power grid.
///
/// Nodes are known by their external ids; internally they are stored densely
/// and their positions can change when other nodes are deleted. Branches are
/// unordered node pairs, and several branches can connect the same pair.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    graph: UnGraph<i64, ()>,
    node_indices: NodeIndexMap,
}

// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! graphs shared by the tests of the `graph` module.

use crate::{Error, GraphModel};

/// Nodes 1 to 5, without branches.
pub(crate) fn graph_with_5_nodes() -> Result<GraphModel, Error> {
    let mut graph = GraphModel::new();
    for id in 1..=5 {
        graph.add_node(id)?;
    }
    Ok(graph)
}

/// Two routes starting at node 1: 1-2-3 and 1-5-4.
pub(crate) fn graph_with_2_routes() -> Result<GraphModel, Error> {
    let mut graph = graph_with_5_nodes()?;
    graph.add_branch(1, 2)?;
    graph.add_branch(2, 3)?;
    graph.add_branch(1, 5)?;
    graph.add_branch(5, 4)?;
    Ok(graph)
}

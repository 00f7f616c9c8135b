// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Path, reachability and component queries on a [`GraphModel`].
//!
//! Breadth-first searches visit the neighbors of a node in the order the
//! underlying graph stores them, which only depends on the sequence of
//! mutations, so results are deterministic.

use super::GraphModel;
use crate::Error;
use petgraph::graph::NodeIndex;
use petgraph::visit::{Bfs, NodeFiltered};
use std::collections::HashSet;

impl GraphModel {
    /// The shortest path between two nodes and its number of branches.
    ///
    /// The path from a node to itself is that node alone, with length 0.
    pub fn get_shortest_path(&self, from_id: i64, to_id: i64) -> Result<(Vec<i64>, usize), Error> {
        let from = self.index_of(from_id)?;
        let to = self.index_of(to_id)?;
        petgraph::algo::astar(&self.graph, from, |n| n == to, |_| 1_usize, |_| 0)
            .map(|(length, path)| (self.ids_of(&path), length))
            .ok_or_else(|| no_path(from_id, to_id))
    }

    /// Every simple path between two nodes.
    ///
    /// Parallel branches do not make a path count twice.
    pub fn get_all_paths(&self, from_id: i64, to_id: i64) -> Result<Vec<Vec<i64>>, Error> {
        let from = self.index_of(from_id)?;
        let to = self.index_of(to_id)?;
        let mut paths: Vec<Vec<i64>> = vec![];
        for path in petgraph::algo::all_simple_paths::<Vec<NodeIndex>, _>(&self.graph, from, to, 0, None) {
            let path = self.ids_of(&path);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(no_path(from_id, to_id));
        }
        Ok(paths)
    }

    /// The nodes reachable from `node_id`, in breadth-first order.
    ///
    /// Nodes in `nodes_to_ignore` are treated as if they were not in the
    /// graph. The start node is only included when `inclusive` is set.
    pub fn get_connected(
        &self,
        node_id: i64,
        inclusive: bool,
        nodes_to_ignore: &[i64],
    ) -> Result<Vec<i64>, Error> {
        let start = self.index_of(node_id)?;
        let ignored: HashSet<NodeIndex> = nodes_to_ignore
            .iter()
            .filter_map(|id| self.node_indices.get(id).copied())
            .filter(|&idx| idx != start)
            .collect();
        let filtered = NodeFiltered::from_fn(&self.graph, |idx| !ignored.contains(&idx));

        let mut bfs = Bfs::new(&filtered, start);
        let mut connected = vec![];
        while let Some(idx) = bfs.next(&filtered) {
            if idx != start || inclusive {
                connected.push(self.graph[idx]);
            }
        }
        Ok(connected)
    }

    /// The first of `candidate_node_ids` reached by a breadth-first search
    /// from `node_id`.
    ///
    /// Fails with `InvalidValue` if `node_id` is a candidate itself, and with
    /// `MissingNode` if no candidate can be reached.
    pub fn find_first_connected(&self, node_id: i64, candidate_node_ids: &[i64]) -> Result<i64, Error> {
        if candidate_node_ids.contains(&node_id) {
            return Err(Error::invalid_value(format!(
                "Node {node_id} is one of the candidates."
            )));
        }
        self.get_connected(node_id, false, &[])?
            .into_iter()
            .find(|id| candidate_node_ids.contains(id))
            .ok_or_else(|| {
                Error::missing_node(format!(
                    "None of the candidates can be reached from node {node_id}."
                ))
            })
    }

    /// The groups of nodes that stay connected when the substation nodes are
    /// removed.
    ///
    /// Groups are ordered by the position of their first node before the
    /// removal.
    pub fn get_components(&mut self, substation_nodes: &[i64]) -> Result<Vec<Vec<i64>>, Error> {
        let order = self.external_ids();
        let without_substations = self.tmp_remove_nodes(substation_nodes)?;

        let mut seen: HashSet<i64> = HashSet::new();
        let mut components = vec![];
        for id in order {
            if seen.contains(&id) || !without_substations.has_node(id) {
                continue;
            }
            let component = without_substations.get_connected(id, true, &[])?;
            seen.extend(component.iter().copied());
            components.push(component);
        }
        Ok(components)
    }

    fn ids_of(&self, path: &[NodeIndex]) -> Vec<i64> {
        path.iter().map(|&idx| self.graph[idx]).collect()
    }
}

fn no_path(from_id: i64, to_id: i64) -> Error {
    Error::no_path_between_nodes(format!("No path between nodes {from_id} and {to_id}."))
}

#[cfg(test)]
mod tests {
    use crate::graph::test_utils::{graph_with_2_routes, graph_with_5_nodes};
    use crate::{Error, ErrorKind};
    use std::collections::HashSet;

    fn set(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_shortest_path() -> Result<(), Error> {
        let graph = graph_with_2_routes()?;
        assert_eq!(graph.get_shortest_path(1, 3)?, (vec![1, 2, 3], 2));

        let mut graph = graph_with_5_nodes()?;
        graph.add_branch(1, 2)?;
        graph.add_branch(2, 3)?;
        assert_eq!(graph.get_shortest_path(1, 3)?, (vec![1, 2, 3], 2));
        assert_eq!(graph.get_shortest_path(1, 1)?, (vec![1], 0));

        graph.add_branch(4, 5)?;
        assert!(graph
            .get_shortest_path(1, 5)
            .is_err_and(|e| e.kind() == ErrorKind::NoPathBetweenNodes));
        Ok(())
    }

    #[test]
    fn test_all_paths() -> Result<(), Error> {
        let mut graph = graph_with_5_nodes()?;
        assert!(graph
            .get_all_paths(1, 2)
            .is_err_and(|e| e.kind() == ErrorKind::NoPathBetweenNodes));

        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)] {
            graph.add_branch(a, b)?;
        }
        let paths = graph.get_all_paths(1, 3)?;
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&vec![1, 2, 3]));
        assert!(paths.contains(&vec![1, 5, 4, 3]));

        graph.add_branch(2, 1)?;
        assert_eq!(graph.get_all_paths(1, 3)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_get_connected() -> Result<(), Error> {
        let mut graph = graph_with_2_routes()?;
        let connected = graph.get_connected(1, false, &[])?;
        assert_eq!(set(&connected), set(&[2, 3, 4, 5]));
        assert_eq!(set(&connected[..2]), set(&[2, 5]));
        assert_eq!(set(&connected[2..]), set(&[3, 4]));

        assert_eq!(set(&graph.get_connected(1, true, &[])?), set(&[1, 2, 3, 4, 5]));
        assert_eq!(set(&graph.get_connected(1, false, &[4])?), set(&[2, 3, 5]));
        assert_eq!(graph.get_connected(1, false, &[2, 4])?, vec![5]);

        for id in [9, 10, 11] {
            graph.add_node(id)?;
        }
        graph.add_branch(9, 10)?;
        graph.add_branch(10, 11)?;
        assert_eq!(set(&graph.get_connected(1, true, &[])?), set(&[1, 2, 3, 4, 5]));
        assert_eq!(set(&graph.get_connected(9, true, &[])?), set(&[9, 10, 11]));
        assert!(graph
            .get_connected(42, true, &[])
            .is_err_and(|e| e.kind() == ErrorKind::MissingNode));
        Ok(())
    }

    #[test]
    fn test_find_first_connected() -> Result<(), Error> {
        let mut graph = graph_with_2_routes()?;
        assert_eq!(graph.find_first_connected(1, &[2, 3, 4])?, 2);
        assert!(graph
            .find_first_connected(1, &[1, 3, 5])
            .is_err_and(|e| e.kind() == ErrorKind::InvalidValue));

        graph.add_node(99)?;
        assert!(graph
            .find_first_connected(1, &[99])
            .is_err_and(|e| e.kind() == ErrorKind::MissingNode));
        Ok(())
    }

    #[test]
    fn test_get_components() -> Result<(), Error> {
        let mut graph = graph_with_2_routes()?;
        graph.add_node(99)?;
        graph.add_branch(1, 99)?;

        let components = graph.get_components(&[1])?;
        assert_eq!(components.len(), 3);
        assert_eq!(set(&components[0]), set(&[2, 3]));
        assert_eq!(set(&components[1]), set(&[4, 5]));
        assert_eq!(set(&components[2]), set(&[99]));

        assert_eq!(graph.nr_nodes(), 6);
        assert_eq!(graph.nr_branches(), 5);
        Ok(())
    }
}

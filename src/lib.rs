// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Power Grid Topology

This is a library for representing a power grid as typed, columnar record
arrays (nodes, lines, transformers, loads, sensors, ...) bound together with
graphs of the grid's connectivity.

## Record arrays

A [`RecordArray`] is an in-memory table with a fixed [`Schema`][array::Schema]:
named, typed columns with optional defaults, extended by descending schemas.
Arrays can be filtered, updated by id, sorted, concatenated and compared.
The schemas of the grid components are in the [`arrays`] module, for example
[`LineArray`][arrays::LineArray].

## Grids

A [`Grid`] holds one record array per [`ArrayKind`], all sharing the id
space of an [`ArrayContainer`], and a [`GraphContainer`] with two
[`GraphModel`]s:

- the complete graph, with every branch of the grid.
- the active graph, with only the branches that are in service at both ends.

Grid mutations such as [`add_branch`][Grid::add_branch],
[`delete_node`][Grid::delete_node] or [`make_inactive`][Grid::make_inactive]
keep arrays and graphs consistent, and remove the rows that depend on a
deleted node or branch.

Grids can be created from a compact text notation with
[`from_txt`][Grid::from_txt], and saved and restored through a serializable
[`GridSnapshot`].

## Topology queries

- [`get_nearest_substation_node`][Grid::get_nearest_substation_node]
- [`get_downstream_nodes`][Grid::get_downstream_nodes]
- [`get_branches_in_path`][Grid::get_branches_in_path]
- [`set_feeder_ids`][Grid::set_feeder_ids]
- and, on the graphs, shortest and simple paths, connected components and
  fundamental cycles.

## Power flow

The [`load_flow`] module connects a grid to a power flow engine implementing
the [`PowerFlowSolver`][load_flow::PowerFlowSolver] trait.
*/

pub mod array;
pub use array::RecordArray;

mod array_kind;
pub(crate) use array_kind::KindPredicates;
pub use array_kind::ArrayKind;

pub mod arrays;
pub use arrays::EMPTY_ID;

mod config;
pub use config::GridConfig;

mod container;
pub use container::ArrayContainer;

mod graph;
pub use graph::{iterators, GraphModel, TmpRemovedNodes};

mod graph_container;
pub use graph_container::GraphContainer;

mod grid;
pub use grid::{ArraySnapshot, BranchSide, Grid, GridSnapshot};

pub mod load_flow;

mod error;
pub use error::{Error, ErrorKind};

#[cfg(test)]
mod test_utils;

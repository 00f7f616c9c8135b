// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A compact text notation for grid topologies.
//!
//! Every line describes one branch as `<from> <to> [<id>][,<flag>]*`, where a
//! node written as `S<id>` is a substation node. Flags are `open` for a
//! branch that is not in service at its to side, and `transformer`, `link` or
//! `line` for the branch type, `line` being the default. Branches without an
//! id get ids following the highest node or branch id in the text.

use super::Grid;
use crate::array::{ArrayType, RecordArray};
use crate::arrays::{BranchColumns, LineArray, LinkArray, NodeArray, NodeType, TransformerArray};
use crate::{ArrayKind, Error};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// A branch as read from one line of text.
#[derive(Debug)]
struct TxtBranch {
    from_node: i64,
    to_node: i64,
    id: Option<i64>,
    kind: ArrayKind,
    open: bool,
}

/// Parses a node token, returning the id and whether it is a substation.
fn parse_node(token: &str, line: &str) -> Result<(i64, bool), Error> {
    let (digits, substation) = match token.strip_prefix('S') {
        Some(digits) => (digits, true),
        None => (token, false),
    };
    let id = digits.parse::<i64>().map_err(|_| {
        Error::invalid_value(format!("Invalid node '{token}' in line '{line}'."))
    })?;
    Ok((id, substation))
}

fn parse_branch(
    line: &str,
    nodes: &mut BTreeMap<i64, bool>,
) -> Result<TxtBranch, Error> {
    let mut tokens = line.split_whitespace();
    let (Some(from), Some(to)) = (tokens.next(), tokens.next()) else {
        return Err(Error::invalid_value(format!(
            "Line '{line}' needs a from and a to node."
        )));
    };

    let mut branch = TxtBranch {
        from_node: 0,
        to_node: 0,
        id: None,
        kind: ArrayKind::Line,
        open: false,
    };
    for (token, node) in [(from, &mut branch.from_node), (to, &mut branch.to_node)] {
        let (id, substation) = parse_node(token, line)?;
        if *nodes.entry(id).or_insert(substation) != substation {
            return Err(Error::invalid_value(format!(
                "Node {id} is written both with and without 'S' (line '{line}')."
            )));
        }
        *node = id;
    }

    let mut kind = None;
    for part in tokens.flat_map(|token| token.split(',')).filter(|p| !p.is_empty()) {
        let part_kind = match part {
            "open" => {
                branch.open = true;
                continue;
            }
            "transformer" => ArrayKind::Transformer,
            "link" => ArrayKind::Link,
            "line" => ArrayKind::Line,
            _ => {
                let id = part.parse::<i64>().map_err(|_| {
                    Error::invalid_value(format!("Unknown flag '{part}' in line '{line}'."))
                })?;
                if branch.id.replace(id).is_some() {
                    return Err(Error::invalid_value(format!(
                        "Line '{line}' has more than one branch id."
                    )));
                }
                continue;
            }
        };
        if kind.replace(part_kind).is_some_and(|k| k != part_kind) {
            return Err(Error::invalid_value(format!(
                "Line '{line}' has more than one branch type."
            )));
        }
    }
    branch.kind = kind.unwrap_or(ArrayKind::Line);
    Ok(branch)
}

/// Builds the member array of `kind` from the branches of that kind.
fn branch_array(kind: ArrayKind, branches: &[(i64, &TxtBranch)]) -> Result<RecordArray, Error> {
    let rows: Vec<_> = branches.iter().filter(|(_, b)| b.kind == kind).collect();
    let builder = match kind {
        ArrayKind::Transformer => TransformerArray::builder(),
        ArrayKind::Link => LinkArray::builder(),
        _ => LineArray::builder(),
    };
    builder
        .column("id", rows.iter().map(|(id, _)| *id))
        .column("from_node", rows.iter().map(|(_, b)| b.from_node))
        .column("to_node", rows.iter().map(|(_, b)| b.to_node))
        .column("from_status", rows.iter().map(|_| 1))
        .column("to_status", rows.iter().map(|(_, b)| if b.open { 0 } else { 1 }))
        .build()
}

impl Grid {
    /// Creates a grid from lines in the text notation of this module.
    ///
    /// Each item may hold several lines; blank lines are skipped. Fails with
    /// `InvalidValue` on malformed lines, on a node written both with and
    /// without `S`, and on branch ids that are used twice or that are also
    /// node ids.
    ///
    /// <details>
    /// <summary>Example</summary>
    ///
    /// ```ignore
    /// let grid = Grid::from_txt(["S1 2", "S1 3 open", "2 3 10,transformer"])?;
    /// assert_eq!(grid.transformer()?.ids()?, &[10]);
    /// ```
    ///
    /// </details>
    pub fn from_txt<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Result<Grid, Error> {
        let mut nodes = BTreeMap::new();
        let mut branches = vec![];
        for item in lines {
            for line in item.as_ref().lines().map(str::trim).filter(|l| !l.is_empty()) {
                branches.push(parse_branch(line, &mut nodes)?);
            }
        }

        let mut explicit = HashSet::new();
        for id in branches.iter().filter_map(|b| b.id) {
            if nodes.contains_key(&id) || !explicit.insert(id) {
                return Err(Error::invalid_value(format!(
                    "Branch id {id} is used more than once."
                )));
            }
        }
        let mut counter = nodes
            .keys()
            .chain(explicit.iter())
            .copied()
            .max()
            .unwrap_or(0);
        let branches: Vec<(i64, &TxtBranch)> = branches
            .iter()
            .map(|branch| {
                let id = branch.id.unwrap_or_else(|| {
                    counter += 1;
                    counter
                });
                (id, branch)
            })
            .collect();

        let node_type = |substation: bool| match substation {
            true => NodeType::SubstationNode.value(),
            false => NodeType::Unspecified.value(),
        };
        let node = NodeArray::builder()
            .column("id", nodes.keys().copied())
            .column("node_type", nodes.values().map(|&s| node_type(s)))
            .build()?;

        let mut grid = Grid::empty()?;
        let arrays = ArrayKind::BRANCHES
            .into_iter()
            .map(|kind| branch_array(kind, &branches));
        for array in std::iter::once(Ok(node)).chain(arrays) {
            let array = array?;
            if !array.is_empty() {
                grid.append(&array, false)?;
            }
        }
        tracing::debug!(
            "Created a grid with {} nodes and {} branches from text.",
            nodes.len(),
            branches.len()
        );
        Ok(grid)
    }

    /// Creates a grid from a file in the text notation, see
    /// [`from_txt`][Grid::from_txt].
    pub fn from_txt_file(path: impl AsRef<Path>) -> Result<Grid, Error> {
        let text = std::fs::read_to_string(path)?;
        Grid::from_txt([text])
    }

    /// The branch lines of the text notation.
    fn txt_lines(&self) -> Result<Vec<String>, Error> {
        let substations: HashSet<i64> = self.substation_ids()?.into_iter().collect();
        let node = |id: i64| match substations.contains(&id) {
            true => format!("S{id}"),
            false => id.to_string(),
        };
        let mut lines = vec![];
        for kind in ArrayKind::BRANCHES {
            let branches = self.array(kind)?;
            let active = branches.is_active()?;
            let from_nodes = branches.ints("from_node")?;
            let to_nodes = branches.ints("to_node")?;
            for (row, id) in branches.ids()?.iter().enumerate() {
                let mut line = format!("{} {} {id}", node(from_nodes[row]), node(to_nodes[row]));
                if !active[row] {
                    line.push_str(",open");
                }
                match kind {
                    ArrayKind::Transformer => line.push_str(",transformer"),
                    ArrayKind::Link => line.push_str(",link"),
                    _ => {}
                }
                lines.push(line);
            }
        }
        Ok(lines)
    }
}

/// Writes the topology of the grid in the text notation, one branch per
/// line.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.txt_lines().map_err(|_| fmt::Error)?;
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use crate::arrays::BranchColumns;
    use crate::test_utils::basic_grid;
    use crate::{Error, ErrorKind, Grid};
    use std::io::Write;

    const TOPOLOGY: [&str; 8] = [
        "S1 2",
        "S1 3 open",
        "2 7",
        "3 5",
        "3 6 transformer",
        "5 7",
        "7 8",
        "8 9",
    ];

    #[test]
    fn test_from_txt() -> Result<(), Error> {
        let grid = Grid::from_txt(TOPOLOGY)?;
        assert_eq!(grid.node()?.len(), 8);
        assert_eq!(grid.node()?.ids()?, &[1, 2, 3, 5, 6, 7, 8, 9]);
        assert_eq!(grid.substation_ids()?, vec![1]);
        assert_eq!(grid.transformer()?.len(), 1);
        assert_eq!(grid.line()?.len(), 7);

        let branches = grid.branches()?;
        assert_eq!(branches.ids()?, &[14, 10, 11, 12, 13, 15, 16, 17]);
        assert_eq!(branches.is_active()?.iter().filter(|&&a| !a).count(), 1);
        assert_eq!(grid.graphs().active_graph().nr_branches(), 7);
        assert_eq!(grid.graphs().complete_graph().nr_branches(), 8);
        assert_eq!(grid.id_counter(), 17);
        Ok(())
    }

    #[test]
    fn test_from_txt_with_ids() -> Result<(), Error> {
        let grid = Grid::from_txt([
            "S1 2 91",
            "S1 3 92,open",
            "2 7 93",
            "3 5 94",
            "3 6 95,transformer",
            "5 7 96",
            "7 8 97",
            "8 9 98,link",
        ])?;
        assert_eq!(grid.branches()?.ids()?, &[95, 91, 92, 93, 94, 96, 97, 98]);
        assert_eq!(grid.link()?.ids()?, &[98]);
        assert_eq!(grid.line()?.ints("to_status")?, &[1, 0, 1, 1, 1, 1]);
        Ok(())
    }

    #[test]
    fn test_from_txt_partial_ids() -> Result<(), Error> {
        let grid = Grid::from_txt(["S1 2 20", "2 3", "3 4 line"])?;
        assert_eq!(grid.line()?.ids()?, &[20, 21, 22]);
        Ok(())
    }

    #[test]
    fn test_from_txt_unordered() -> Result<(), Error> {
        let grid = Grid::from_txt(["7 8", "S1 2", "8 9", "S4 5\n3 5", "2 6", "6 7", ""])?;
        assert_eq!(grid.node()?.len(), 9);
        assert_eq!(grid.node()?.ids()?, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(grid.substation_ids()?, vec![1, 4]);
        assert_eq!(grid.line()?.ids()?, &[10, 11, 12, 13, 14, 15, 16]);
        Ok(())
    }

    #[test]
    fn test_from_txt_errors() -> Result<(), Error> {
        let invalid: [&[&str]; 7] = [
            &["S1"],
            &["S1 x"],
            &["S1 2", "1 3"],
            &["S1 2 5", "2 3 5"],
            &["S1 2 2"],
            &["S1 2 unknown"],
            &["S1 2 transformer,link"],
        ];
        for lines in invalid {
            assert!(
                Grid::from_txt(lines).is_err_and(|e| e.kind() == ErrorKind::InvalidValue),
                "{lines:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_from_txt_file() -> Result<(), Error> {
        let path = std::env::temp_dir().join("power_grid_topology_from_txt_file.txt");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "{}", TOPOLOGY.join("\n"))?;
        drop(file);

        let grid = Grid::from_txt_file(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(grid.node()?.len(), 8);

        assert!(Grid::from_txt_file(&path).is_err_and(|e| e.kind() == ErrorKind::Io));
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), Error> {
        let grid = basic_grid()?;
        let text = grid.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines.contains(&"102 106 301,transformer"));
        assert!(lines.contains(&"S101 102 201"));
        assert!(lines.contains(&"103 104 203,open"));
        assert!(lines.contains(&"104 105 601,link"));

        let parsed = Grid::from_txt(text.lines())?;
        assert_eq!(parsed.branches()?.ids()?, grid.branches()?.ids()?);
        assert_eq!(
            parsed.branches()?.is_active()?,
            grid.branches()?.is_active()?
        );
        assert_eq!(parsed.substation_ids()?, vec![101]);
        Ok(())
    }
}

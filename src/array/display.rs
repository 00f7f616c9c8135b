// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Tabular rendering of record arrays.

use super::RecordArray;
use std::fmt::Display;

/// Arrays with more rows than this are shown with their middle rows hidden.
const MAX_ROWS: usize = 10;
/// Rows shown on each side of the hidden band.
const EDGE_ROWS: usize = 5;

impl RecordArray {
    /// Renders the array with every column `column_width` characters wide.
    ///
    /// Longer names and values are cut and end in `..`.
    pub fn as_table(&self, column_width: usize) -> String {
        self.render(|_| column_width)
    }

    fn cells(&self, row: usize) -> Vec<String> {
        self.columns()
            .iter()
            .map(|c| c.get(row).to_string())
            .collect()
    }

    fn shown_rows(&self) -> (Vec<usize>, Option<usize>) {
        let len = self.len();
        if len <= MAX_ROWS {
            return ((0..len).collect(), None);
        }
        let rows = (0..EDGE_ROWS).chain(len - EDGE_ROWS..len).collect();
        (rows, Some(EDGE_ROWS))
    }

    fn render(&self, width_of: impl Fn(usize) -> usize) -> String {
        let (rows, hidden_at) = self.shown_rows();
        let header: Vec<String> = self.column_names().map(str::to_string).collect();
        let body: Vec<Vec<String>> = rows.iter().map(|&r| self.cells(r)).collect();
        let widths: Vec<usize> = (0..header.len()).map(&width_of).collect();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| fit(cell, width))
                .collect::<Vec<_>>()
                .join("|")
        };

        let mut lines = vec![line(&header)];
        for (idx, cells) in body.iter().enumerate() {
            if Some(idx) == hidden_at {
                let hidden = self.len() - 2 * EDGE_ROWS;
                lines.push(format!("(..{hidden} hidden rows..)"));
            }
            lines.push(line(cells));
        }
        if body.is_empty() {
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// Width of each column: its longest name or shown value, plus a space
    /// on each side.
    fn auto_widths(&self) -> Vec<usize> {
        let (rows, _) = self.shown_rows();
        self.column_names()
            .enumerate()
            .map(|(idx, name)| {
                let longest = rows
                    .iter()
                    .map(|&row| self.columns()[idx].get(row).to_string().chars().count())
                    .max()
                    .unwrap_or(0);
                longest.max(name.chars().count()) + 2
            })
            .collect()
    }
}

/// Centers `text` in `width` characters, cutting it with `..` when needed.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(2)).collect();
        return format!("{kept:.<width$}");
    }
    format!("{text:^width$}")
}

impl Display for RecordArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths = self.auto_widths();
        write!(f, "{}", self.render(|idx| widths[idx]))
    }
}

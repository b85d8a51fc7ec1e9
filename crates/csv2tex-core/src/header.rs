//! Header composition: turning the leading rows into header cells

use crate::error::{Error, Result};
use crate::escape::{escape_latex, flatten_lines, is_missing_value};
use crate::table::Row;

/// Line break placed between stacked header lines within one cell
pub const CELL_LINE_BREAK: &str = "\\\\";

/// A header cell spanning one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Escaped cell text
    pub text: String,
    /// Number of columns covered (1 for an ordinary cell)
    pub span: usize,
}

impl HeaderCell {
    pub fn new(text: impl Into<String>, span: usize) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// One header row in the `Rows` layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub cells: Vec<HeaderCell>,
    /// Inclusive 1-based column ranges to underline after this row
    pub rules: Vec<(usize, usize)>,
}

/// Escape a header fragment; missing markers become empty when requested
fn header_fragment(text: &str, mark_missing: bool) -> String {
    if mark_missing && is_missing_value(text) {
        String::new()
    } else {
        escape_latex(&flatten_lines(text))
    }
}

fn take_header_rows(rows: &[Row], header_line_count: usize) -> Result<&[Row]> {
    if header_line_count == 0 {
        return Err(Error::InvalidOptions(
            "header_line_count must be at least 1".to_string(),
        ));
    }
    if rows.len() < header_line_count {
        return Err(Error::InsufficientHeaderRows {
            requested: header_line_count,
            available: rows.len(),
        });
    }
    Ok(&rows[..header_line_count])
}

/// Merge the first `header_line_count` rows into one header cell per column
///
/// Each column's fragments are escaped, then joined with `\\` so the cell
/// renders as stacked lines. A single header line passes through unchanged
/// apart from escaping.
pub fn compose_header(
    rows: &[Row],
    header_line_count: usize,
    columns: usize,
    mark_missing: bool,
) -> Result<Vec<String>> {
    let header_rows = take_header_rows(rows, header_line_count)?;

    let cells = (0..columns)
        .map(|col| {
            header_rows
                .iter()
                .map(|row| header_fragment(row.get(col).unwrap_or(""), mark_missing))
                .collect::<Vec<_>>()
                .join(CELL_LINE_BREAK)
        })
        .collect();

    Ok(cells)
}

/// Lay out the first `header_line_count` rows as separate header rows
///
/// In every row but the last, a non-empty cell followed by empty cells spans
/// them when the next row has content underneath; the span is underlined.
pub fn compose_header_rows(
    rows: &[Row],
    header_line_count: usize,
    columns: usize,
    mark_missing: bool,
) -> Result<Vec<HeaderLine>> {
    let header_rows = take_header_rows(rows, header_line_count)?;

    let texts: Vec<Vec<String>> = header_rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|col| header_fragment(row.get(col).unwrap_or(""), mark_missing))
                .collect()
        })
        .collect();

    let mut lines = Vec::with_capacity(texts.len());
    for (line_idx, line) in texts.iter().enumerate() {
        let next = texts.get(line_idx + 1);
        let mut cells = Vec::new();
        let mut rules = Vec::new();
        let mut col = 0;

        while col < columns {
            let text = &line[col];
            let mut span = 1;

            if let Some(next) = next.filter(|_| !text.is_empty()) {
                let trailing_empty = line[col + 1..]
                    .iter()
                    .take_while(|t| t.is_empty())
                    .count();
                let candidate = 1 + trailing_empty;
                let covers_content = next[col..col + candidate].iter().any(|t| !t.is_empty());
                if candidate > 1 && covers_content {
                    span = candidate;
                    rules.push((col + 1, col + span));
                }
            }

            cells.push(HeaderCell::new(text.clone(), span));
            col += span;
        }

        lines.push(HeaderLine { cells, rules });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .enumerate()
            .map(|(i, r)| Row::new(i + 1, r.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_single_line_passes_through() {
        let rows = rows(&[&["name", "score"], &["Alice", "90"]]);
        let header = compose_header(&rows, 1, 2, false).unwrap();
        assert_eq!(header, vec!["name", "score"]);
        assert!(header.iter().all(|c| !c.contains(CELL_LINE_BREAK)));
    }

    #[test]
    fn test_two_lines_stacked() {
        let rows = rows(&[&["Line1A", "Line1B"], &["Line2A", "Line2B"], &["x", "y"]]);
        let header = compose_header(&rows, 2, 2, false).unwrap();
        assert_eq!(header, vec!["Line1A\\\\Line2A", "Line1B\\\\Line2B"]);
    }

    #[test]
    fn test_fragments_escaped_before_joining() {
        let rows = rows(&[&["Cost", "Share"], &["$", "%"]]);
        let header = compose_header(&rows, 2, 2, false).unwrap();
        assert_eq!(header, vec!["Cost\\\\\\$", "Share\\\\\\%"]);
    }

    #[test]
    fn test_empty_fragment_kept() {
        let rows = rows(&[&["", "b"], &["a", ""]]);
        let header = compose_header(&rows, 2, 2, false).unwrap();
        assert_eq!(header, vec!["\\\\a", "b\\\\"]);
    }

    #[test]
    fn test_missing_markers_blank_in_header() {
        let rows = rows(&[&["Group", "NA"], &["a", "b"]]);
        let header = compose_header(&rows, 2, 2, true).unwrap();
        assert_eq!(header, vec!["Group\\\\a", "\\\\b"]);
    }

    #[test]
    fn test_insufficient_header_rows() {
        let rows = rows(&[&["a", "b"]]);
        match compose_header(&rows, 3, 2, false) {
            Err(Error::InsufficientHeaderRows {
                requested,
                available,
            }) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_zero_header_lines() {
        let rows = rows(&[&["a"]]);
        assert!(matches!(
            compose_header(&rows, 0, 1, false),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_rows_layout_groups() {
        let rows = rows(&[
            &["Ref", "Method", "Predicted", "", ""],
            &["", "", "a", "b", "c"],
        ]);
        let lines = compose_header_rows(&rows, 2, 5, false).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].cells,
            vec![
                HeaderCell::new("Ref", 1),
                HeaderCell::new("Method", 1),
                HeaderCell::new("Predicted", 3),
            ]
        );
        assert_eq!(lines[0].rules, vec![(3, 5)]);

        assert_eq!(lines[1].cells.len(), 5);
        assert!(lines[1].rules.is_empty());
    }

    #[test]
    fn test_rows_layout_no_span_without_content_below() {
        let rows = rows(&[&["Name", "", "Score"], &["", "", "pts"]]);
        let lines = compose_header_rows(&rows, 2, 3, false).unwrap();

        assert_eq!(lines[0].cells.len(), 3);
        assert!(lines[0].cells.iter().all(|c| c.span == 1));
        assert!(lines[0].rules.is_empty());
    }

    #[test]
    fn test_rows_layout_single_line() {
        let rows = rows(&[&["a", "", "c"]]);
        let lines = compose_header_rows(&rows, 1, 3, false).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].cells.iter().all(|c| c.span == 1));
    }
}

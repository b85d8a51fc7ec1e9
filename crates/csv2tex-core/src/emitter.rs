//! LaTeX table emitter
//!
//! Assembles the complete table block from composed header cells and body
//! rows. Emission is pure: the same header, rows and options always give
//! byte-identical text.

use crate::escape::{escape_markup, render_cell};
use crate::header::HeaderLine;
use crate::options::{ColumnAlign, RenderOptions, TableEnvironment};
use crate::table::Row;

/// Terminator appended to every table row
pub const ROW_END: &str = " \\\\";

/// Separator placed between cells of a row
pub const CELL_SEPARATOR: &str = " & ";

/// Composed header, in one of the two layouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// One row; each cell may hold several `\\`-separated lines
    Stacked(Vec<String>),
    /// One row per header line, with spans and partial rules
    Rows(Vec<HeaderLine>),
}

/// Horizontal rules for the chosen style
struct Rules {
    top: &'static str,
    mid: &'static str,
    bottom: &'static str,
    booktabs: bool,
}

impl Rules {
    fn for_options(options: &RenderOptions) -> Self {
        if options.booktabs {
            Self {
                top: "\\toprule",
                mid: "\\midrule",
                bottom: "\\bottomrule",
                booktabs: true,
            }
        } else {
            Self {
                top: "\\hline",
                mid: "\\hline",
                bottom: "\\hline",
                booktabs: false,
            }
        }
    }

    fn partial(&self, from: usize, to: usize) -> String {
        if self.booktabs {
            format!("\\cmidrule(lr){{{}-{}}}", from, to)
        } else {
            format!("\\cline{{{}-{}}}", from, to)
        }
    }
}

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

/// Column specification, e.g. `ll` for two left-aligned columns
pub fn column_spec(columns: usize, align: &ColumnAlign) -> String {
    align.specifier().repeat(columns)
}

fn header_lines(header: &Header, rules: &Rules) -> Vec<String> {
    match header {
        Header::Stacked(cells) => vec![format!("{}{}", cells.join(CELL_SEPARATOR), ROW_END)],
        Header::Rows(lines) => {
            let mut out = Vec::new();
            for line in lines {
                let cells: Vec<String> = line
                    .cells
                    .iter()
                    .map(|cell| {
                        if cell.span > 1 {
                            format!("\\multicolumn{{{}}}{{c}}{{{}}}", cell.span, cell.text)
                        } else {
                            cell.text.clone()
                        }
                    })
                    .collect();
                out.push(format!("{}{}", cells.join(CELL_SEPARATOR), ROW_END));

                if !line.rules.is_empty() {
                    let partial: Vec<String> = line
                        .rules
                        .iter()
                        .map(|&(from, to)| rules.partial(from, to))
                        .collect();
                    out.push(partial.join(" "));
                }
            }
            out
        }
    }
}

fn body_line(row: &Row, mark_missing: bool) -> String {
    let cells: Vec<String> = row
        .fields
        .iter()
        .map(|field| render_cell(field, mark_missing))
        .collect();
    format!("{}{}", cells.join(CELL_SEPARATOR), ROW_END)
}

/// Produce the full LaTeX table text
pub fn emit_table(header: &Header, body: &[Row], columns: usize, options: &RenderOptions) -> String {
    let mut out = String::new();

    if options.landscape {
        push_line(&mut out, "\\begin{landscape}");
    }

    match options.environment {
        TableEnvironment::Tabular => emit_tabular(&mut out, header, body, columns, options),
        TableEnvironment::Longtable => emit_longtable(&mut out, header, body, columns, options),
    }

    if options.landscape {
        push_line(&mut out, "\\end{landscape}");
    }

    out
}

fn emit_tabular(
    out: &mut String,
    header: &Header,
    body: &[Row],
    columns: usize,
    options: &RenderOptions,
) {
    let rules = Rules::for_options(options);

    match &options.placement {
        Some(placement) => push_line(out, format!("\\begin{{table}}[{}]", placement)),
        None => push_line(out, "\\begin{table}"),
    }
    push_line(out, "\\centering");
    if let Some(size) = options.font_size {
        push_line(out, size.command());
    }
    if let Some(caption) = &options.caption {
        push_line(out, format!("\\caption{{{}}}", escape_markup(caption)));
    }

    push_line(
        out,
        format!("\\begin{{tabular}}{{{}}}", column_spec(columns, &options.align)),
    );
    push_line(out, rules.top);
    for line in header_lines(header, &rules) {
        push_line(out, line);
    }
    push_line(out, rules.mid);
    for row in body {
        push_line(out, body_line(row, options.mark_missing));
    }
    push_line(out, rules.bottom);
    push_line(out, "\\end{tabular}");

    if let Some(label) = &options.label {
        push_line(out, format!("\\label{{{}}}", escape_markup(label)));
    }
    push_line(out, "\\end{table}");
}

fn emit_longtable(
    out: &mut String,
    header: &Header,
    body: &[Row],
    columns: usize,
    options: &RenderOptions,
) {
    let rules = Rules::for_options(options);
    let head = header_lines(header, &rules);

    if let Some(size) = options.font_size {
        push_line(out, format!("{{{}", size.command()));
    }

    push_line(
        out,
        format!("\\begin{{longtable}}{{{}}}", column_spec(columns, &options.align)),
    );

    let mut title = String::new();
    if let Some(caption) = &options.caption {
        title.push_str(&format!("\\caption{{{}}}", escape_markup(caption)));
    }
    if let Some(label) = &options.label {
        title.push_str(&format!("\\label{{{}}}", escape_markup(label)));
    }
    if !title.is_empty() {
        push_line(out, format!("{}{}", title, ROW_END));
    }

    // First page header
    push_line(out, rules.top);
    for line in &head {
        push_line(out, line);
    }
    push_line(out, rules.mid);
    push_line(out, "\\endfirsthead");

    // Header repeated on continuation pages
    push_line(
        out,
        format!(
            "\\multicolumn{{{}}}{{c}}{{{{\\bfseries \\tablename\\ \\thetable{{}} -- continued from previous page}}}}{}",
            columns, ROW_END
        ),
    );
    push_line(out, rules.top);
    for line in &head {
        push_line(out, line);
    }
    push_line(out, rules.mid);
    push_line(out, "\\endhead");

    push_line(out, rules.mid);
    push_line(
        out,
        format!(
            "\\multicolumn{{{}}}{{r}}{{{{Continued on next page}}}}{}",
            columns, ROW_END
        ),
    );
    push_line(out, "\\endfoot");
    push_line(out, rules.bottom);
    push_line(out, "\\endlastfoot");

    for row in body {
        push_line(out, body_line(row, options.mark_missing));
    }
    push_line(out, "\\end{longtable}");

    if options.font_size.is_some() {
        push_line(out, "}");
    }
}

/// LaTeX packages the emitted markup depends on
pub fn required_packages(options: &RenderOptions) -> Vec<&'static str> {
    let mut packages = Vec::new();
    if matches!(options.align, ColumnAlign::Paragraph(_)) {
        packages.push("array");
    }
    if options.booktabs {
        packages.push("booktabs");
    }
    if options.environment == TableEnvironment::Longtable {
        packages.push("longtable");
    }
    if options.landscape {
        packages.push("lscape");
    }
    packages
}

/// A `\usepackage{...}` line for the required packages, if any
pub fn usepackage_line(options: &RenderOptions) -> Option<String> {
    let packages = required_packages(options);
    if packages.is_empty() {
        None
    } else {
        Some(format!("\\usepackage{{{}}}", packages.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderCell;
    use crate::options::FontSize;
    use pretty_assertions::assert_eq;

    fn body(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .enumerate()
            .map(|(i, r)| Row::new(i + 2, r.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn simple_header() -> Header {
        Header::Stacked(vec!["name".into(), "score".into()])
    }

    #[test]
    fn test_default_tabular() {
        let rows = body(&[&["Alice", "90"], &["Bob", "85"]]);
        let text = emit_table(&simple_header(), &rows, 2, &RenderOptions::default());

        let expected = "\\begin{table}
\\centering
\\begin{tabular}{ll}
\\hline
name & score \\\\
\\hline
Alice & 90 \\\\
Bob & 85 \\\\
\\hline
\\end{tabular}
\\end{table}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_landscape_caption_label() {
        let rows = body(&[&["Alice", "90"]]);
        let options = RenderOptions::new()
            .with_landscape(true)
            .with_caption("Results")
            .with_label("tab:results");
        let text = emit_table(&simple_header(), &rows, 2, &options);

        assert!(text.starts_with("\\begin{landscape}\n\\begin{table}\n"));
        assert!(text.ends_with("\\end{table}\n\\end{landscape}\n"));

        let caption = text.find("\\caption{Results}").unwrap();
        let tabular = text.find("\\begin{tabular}").unwrap();
        let end_tabular = text.find("\\end{tabular}").unwrap();
        let label = text.find("\\label{tab:results}").unwrap();
        assert!(caption < tabular);
        assert!(end_tabular < label);
    }

    #[test]
    fn test_body_cells_escaped() {
        let rows = body(&[&["50%", "a&b"]]);
        let text = emit_table(&simple_header(), &rows, 2, &RenderOptions::default());
        assert!(text.contains("50\\% & a\\&b \\\\\n"));
    }

    #[test]
    fn test_empty_body() {
        let text = emit_table(&simple_header(), &[], 2, &RenderOptions::default());
        assert!(text.contains("name & score \\\\\n\\hline\n\\hline\n\\end{tabular}"));
    }

    #[test]
    fn test_booktabs_rules_and_placement() {
        let mut options = RenderOptions::new().with_booktabs(true);
        options.placement = Some("htbp".into());
        let text = emit_table(&simple_header(), &body(&[&["a", "b"]]), 2, &options);

        assert!(text.starts_with("\\begin{table}[htbp]\n"));
        assert!(text.contains("\\toprule\nname & score \\\\\n\\midrule\n"));
        assert!(text.contains("\\bottomrule\n\\end{tabular}"));
        assert!(!text.contains("\\hline"));
    }

    #[test]
    fn test_paragraph_columns() {
        let options = RenderOptions::new().with_align(ColumnAlign::Paragraph("2cm".into()));
        let text = emit_table(&simple_header(), &[], 2, &options);
        assert!(text.contains(
            "\\begin{tabular}{>{\\raggedright\\arraybackslash}p{2cm}>{\\raggedright\\arraybackslash}p{2cm}}"
        ));
    }

    #[test]
    fn test_rows_header_multicolumn() {
        let header = Header::Rows(vec![
            HeaderLine {
                cells: vec![HeaderCell::new("Ref", 1), HeaderCell::new("Predicted", 2)],
                rules: vec![(2, 3)],
            },
            HeaderLine {
                cells: vec![
                    HeaderCell::new("", 1),
                    HeaderCell::new("a", 1),
                    HeaderCell::new("b", 1),
                ],
                rules: vec![],
            },
        ]);

        let text = emit_table(&header, &[], 3, &RenderOptions::new().with_booktabs(true));
        assert!(text.contains(
            "Ref & \\multicolumn{2}{c}{Predicted} \\\\\n\\cmidrule(lr){2-3}\n & a & b \\\\\n"
        ));

        let plain = emit_table(&header, &[], 3, &RenderOptions::default());
        assert!(plain.contains("\\cline{2-3}"));
    }

    #[test]
    fn test_longtable_sections() {
        let mut options = RenderOptions::new()
            .with_environment(TableEnvironment::Longtable)
            .with_caption("Summary")
            .with_label("tab:summary")
            .with_booktabs(true);
        options.font_size = Some(FontSize::Footnotesize);

        let text = emit_table(&simple_header(), &body(&[&["x", "y"]]), 2, &options);

        assert!(text.starts_with("{\\footnotesize\n\\begin{longtable}{ll}\n"));
        assert!(text.contains("\\caption{Summary}\\label{tab:summary} \\\\\n"));
        assert_eq!(text.matches("name & score \\\\").count(), 2);
        for marker in ["\\endfirsthead", "\\endhead", "\\endfoot", "\\endlastfoot"] {
            assert!(text.contains(marker), "missing {}", marker);
        }
        assert!(text.contains("\\multicolumn{2}{r}{{Continued on next page}} \\\\"));
        assert!(text.ends_with("x & y \\\\\n\\end{longtable}\n}\n"));
    }

    #[test]
    fn test_caption_comment_chars_escaped() {
        let rows = body(&[&["Alice", "90"]]);
        let options = RenderOptions::new()
            .with_caption("Scores 50% up, run #2 & \\textbf{final}")
            .with_label("tab:run#2");

        let text = emit_table(&simple_header(), &rows, 2, &options);
        assert!(text.contains("\\caption{Scores 50\\% up, run \\#2 \\& \\textbf{final}}\n"));
        assert!(text.contains("\\label{tab:run\\#2}\n"));

        let long = emit_table(
            &simple_header(),
            &rows,
            2,
            &options.clone().with_environment(TableEnvironment::Longtable),
        );
        assert!(long.contains("\\caption{Scores 50\\% up, run \\#2 \\& \\textbf{final}}\\label{tab:run\\#2} \\\\\n"));
    }

    #[test]
    fn test_mark_missing_in_body() {
        let mut options = RenderOptions::default();
        options.mark_missing = true;
        let text = emit_table(&simple_header(), &body(&[&["NA", "3"]]), 2, &options);
        assert!(text.contains("\\textemdash & 3 \\\\"));
    }

    #[test]
    fn test_required_packages() {
        assert!(required_packages(&RenderOptions::default()).is_empty());
        assert_eq!(usepackage_line(&RenderOptions::default()), None);

        let options = RenderOptions::new()
            .with_landscape(true)
            .with_booktabs(true)
            .with_environment(TableEnvironment::Longtable)
            .with_align(ColumnAlign::Paragraph("2cm".into()));
        assert_eq!(
            required_packages(&options),
            vec!["array", "booktabs", "longtable", "lscape"]
        );
        assert_eq!(
            usepackage_line(&options).as_deref(),
            Some("\\usepackage{array, booktabs, longtable, lscape}")
        );
    }

    #[test]
    fn test_column_spec() {
        assert_eq!(column_spec(3, &ColumnAlign::Center), "ccc");
    }
}

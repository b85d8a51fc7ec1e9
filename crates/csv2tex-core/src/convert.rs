//! The conversion pipeline: read, compose the header, emit

use crate::emitter::{emit_table, Header};
use crate::error::Result;
use crate::header::{compose_header, compose_header_rows};
use crate::options::{HeaderLayout, RenderOptions};
use crate::output::write_output;
use crate::reader::{read_table, read_table_file};
use crate::table::Table;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a file conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// The generated LaTeX
    pub text: String,
    pub columns: usize,
    pub header_rows: usize,
    pub body_rows: usize,
    /// Encoding the input was decoded with
    pub encoding: String,
    /// Where the text was written, if anywhere
    pub output: Option<PathBuf>,
}

/// Render an already-read table
pub fn render_table(table: &Table, options: &RenderOptions) -> Result<String> {
    options.validate()?;

    let (_, body) = table.split_header(options.header_line_count)?;
    let header = match options.header_layout {
        HeaderLayout::Stacked => Header::Stacked(compose_header(
            &table.rows,
            options.header_line_count,
            table.columns,
            options.mark_missing,
        )?),
        HeaderLayout::Rows => Header::Rows(compose_header_rows(
            &table.rows,
            options.header_line_count,
            table.columns,
            options.mark_missing,
        )?),
    };

    Ok(emit_table(&header, body, table.columns, options))
}

/// Convert CSV from any reader into LaTeX text
pub fn convert<R: Read>(reader: R, options: &RenderOptions) -> Result<String> {
    options.validate()?;
    let table = read_table(reader, PathBuf::from("<input>"), options.ragged)?;
    render_table(&table, options)
}

/// Convert CSV text into LaTeX text
pub fn convert_str(csv: &str, options: &RenderOptions) -> Result<String> {
    convert(csv.as_bytes(), options)
}

/// Convert a CSV file, optionally writing the result to `output`
///
/// Nothing is written unless the whole table was rendered successfully.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
) -> Result<ConversionReport> {
    options.validate()?;

    let table = read_table_file(input, options.ragged)?;
    let text = render_table(&table, options)?;

    if let Some(path) = output {
        write_output(path, &text)?;
    }

    let body_rows = table.row_count() - options.header_line_count;
    info!(
        input = %input.display(),
        columns = table.columns,
        body_rows,
        "converted table"
    );

    Ok(ConversionReport {
        text,
        columns: table.columns,
        header_rows: options.header_line_count,
        body_rows,
        encoding: table.encoding,
        output: output.map(Path::to_path_buf),
    })
}

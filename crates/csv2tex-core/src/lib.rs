//! csv2tex-core: Core library for converting CSV tables into LaTeX
//!
//! This library provides functionality to:
//! - Read comma-separated text into rows, with encoding detection
//! - Compose single- or multi-line table headers
//! - Escape LaTeX special characters in cell text
//! - Emit `tabular` or `longtable` markup, optionally in landscape
//! - Write the result to a file without leaving partial output behind

pub mod convert;
pub mod emitter;
pub mod error;
pub mod escape;
pub mod header;
pub mod options;
pub mod output;
pub mod reader;
pub mod table;

pub use convert::{convert, convert_file, convert_str, render_table, ConversionReport};
pub use emitter::{emit_table, required_packages, usepackage_line, Header};
pub use error::{Error, Result};
pub use escape::{escape_latex, escape_markup, unescape_latex};
pub use header::{compose_header, compose_header_rows, HeaderCell, HeaderLine};
pub use options::{
    ColumnAlign, FontSize, HeaderLayout, RaggedRows, RenderOptions, TableEnvironment,
};
pub use output::write_output;
pub use reader::{read_table, read_table_file, read_table_str, RowReader};
pub use table::{Row, Table};

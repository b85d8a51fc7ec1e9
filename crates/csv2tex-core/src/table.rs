//! Core table types for representing parsed CSV data

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed table: every row carries exactly `columns` fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Number of columns
    pub columns: usize,
    /// Row data, header rows first
    pub rows: Vec<Row>,
    /// Source file path (or a label for in-memory input)
    pub source_path: PathBuf,
    /// Name of the text encoding the source was decoded with
    pub encoding: String,
}

impl Table {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Partition the rows into a header segment and a body segment
    pub fn split_header(&self, header_lines: usize) -> Result<(&[Row], &[Row])> {
        if header_lines > self.rows.len() {
            return Err(Error::InsufficientHeaderRows {
                requested: header_lines,
                available: self.rows.len(),
            });
        }
        Ok(self.rows.split_at(header_lines))
    }
}

/// A row of fields as read from the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based position of the row in the source
    pub index: usize,
    /// Field values, dequoted
    pub fields: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(index: usize, fields: Vec<String>) -> Self {
        Self { index, fields }
    }

    /// Get a field by column index
    pub fn get(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Number of fields in this row
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Pad with empty fields up to `columns`
    pub fn pad_to(&mut self, columns: usize) {
        if self.fields.len() < columns {
            self.fields.resize(columns, String::new());
        }
    }
}

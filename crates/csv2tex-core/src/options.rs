//! Render options and the JSON options file format
//!
//! Options are built once per conversion and consumed read-only by the
//! header composer and the emitter. They can be loaded from (and saved to)
//! a JSON file; missing keys fall back to their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How multiple header rows are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayout {
    /// One header row; each cell stacks its lines with `\\`
    #[default]
    Stacked,
    /// One table row per header line, with spanning group cells
    Rows,
}

impl FromStr for HeaderLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stacked" => Ok(HeaderLayout::Stacked),
            "rows" => Ok(HeaderLayout::Rows),
            _ => Err(Error::InvalidOptions(format!(
                "unknown header layout '{}', expected 'stacked' or 'rows'",
                s
            ))),
        }
    }
}

/// The LaTeX environment holding the rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableEnvironment {
    /// `tabular` inside a `table` float
    #[default]
    Tabular,
    /// `longtable`, which breaks across pages and repeats the header
    Longtable,
}

/// Column alignment, applied to every column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
    /// Fixed-width ragged-right paragraph column, e.g. `2cm`
    Paragraph(String),
}

impl ColumnAlign {
    /// The column specifier for one column
    pub fn specifier(&self) -> String {
        match self {
            ColumnAlign::Left => "l".to_string(),
            ColumnAlign::Center => "c".to_string(),
            ColumnAlign::Right => "r".to_string(),
            ColumnAlign::Paragraph(width) => {
                format!(">{{\\raggedright\\arraybackslash}}p{{{}}}", width)
            }
        }
    }
}

impl FromStr for ColumnAlign {
    type Err = Error;

    /// Accepts `left`/`l`, `center`/`c`, `right`/`r` and `p:<width>`
    fn from_str(s: &str) -> Result<Self> {
        if let Some(width) = s.strip_prefix("p:") {
            if width.trim().is_empty() {
                return Err(Error::InvalidOptions(
                    "paragraph alignment needs a width, e.g. 'p:2cm'".to_string(),
                ));
            }
            return Ok(ColumnAlign::Paragraph(width.trim().to_string()));
        }

        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(ColumnAlign::Left),
            "c" | "center" => Ok(ColumnAlign::Center),
            "r" | "right" => Ok(ColumnAlign::Right),
            _ => Err(Error::InvalidOptions(format!(
                "unknown alignment '{}', expected left, center, right or p:<width>",
                s
            ))),
        }
    }
}

/// LaTeX font size switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Tiny,
    Scriptsize,
    Footnotesize,
    Small,
    Normalsize,
}

impl FontSize {
    /// The size switch command, e.g. `\footnotesize`
    pub fn command(self) -> &'static str {
        match self {
            FontSize::Tiny => "\\tiny",
            FontSize::Scriptsize => "\\scriptsize",
            FontSize::Footnotesize => "\\footnotesize",
            FontSize::Small => "\\small",
            FontSize::Normalsize => "\\normalsize",
        }
    }
}

impl FromStr for FontSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('\\').to_ascii_lowercase().as_str() {
            "tiny" => Ok(FontSize::Tiny),
            "scriptsize" => Ok(FontSize::Scriptsize),
            "footnotesize" => Ok(FontSize::Footnotesize),
            "small" => Ok(FontSize::Small),
            "normalsize" => Ok(FontSize::Normalsize),
            _ => Err(Error::InvalidOptions(format!("unknown font size '{}'", s))),
        }
    }
}

/// What the reader does with rows whose field count differs from the first row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaggedRows {
    /// Fail with a malformed row error
    #[default]
    Reject,
    /// Pad every row with empty fields up to the widest row
    Pad,
}

/// Options controlling how a table is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Number of leading rows forming the header (at least 1)
    pub header_line_count: usize,
    /// Wrap the table in a `landscape` environment
    pub landscape: bool,
    pub caption: Option<String>,
    pub label: Option<String>,
    pub header_layout: HeaderLayout,
    pub environment: TableEnvironment,
    pub align: ColumnAlign,
    /// Use booktabs rules instead of `\hline`
    pub booktabs: bool,
    pub font_size: Option<FontSize>,
    /// Float placement specifier, e.g. `htbp`
    pub placement: Option<String>,
    /// Render missing-value markers (`NA`, `---`, empty, ...) as `\textemdash`
    pub mark_missing: bool,
    pub ragged: RaggedRows,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            header_line_count: 1,
            landscape: false,
            caption: None,
            label: None,
            header_layout: HeaderLayout::default(),
            environment: TableEnvironment::default(),
            align: ColumnAlign::default(),
            booktabs: false,
            font_size: None,
            placement: None,
            mark_missing: false,
            ragged: RaggedRows::default(),
        }
    }
}

impl RenderOptions {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_lines(mut self, count: usize) -> Self {
        self.header_line_count = count;
        self
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_header_layout(mut self, layout: HeaderLayout) -> Self {
        self.header_layout = layout;
        self
    }

    pub fn with_environment(mut self, environment: TableEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_align(mut self, align: ColumnAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_booktabs(mut self, booktabs: bool) -> Self {
        self.booktabs = booktabs;
        self
    }

    pub fn with_ragged(mut self, ragged: RaggedRows) -> Self {
        self.ragged = ragged;
        self
    }

    /// Check the options for values that cannot produce a table
    pub fn validate(&self) -> Result<()> {
        if self.header_line_count == 0 {
            return Err(Error::InvalidOptions(
                "header_line_count must be at least 1".to_string(),
            ));
        }
        if let Some(placement) = &self.placement {
            if placement.is_empty() || !placement.chars().all(|c| "htbpH!".contains(c)) {
                return Err(Error::InvalidOptions(format!(
                    "invalid float placement '{}'",
                    placement
                )));
            }
        }
        if let ColumnAlign::Paragraph(width) = &self.align {
            if width.trim().is_empty() {
                return Err(Error::InvalidOptions(
                    "paragraph column width must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Load options from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let options: RenderOptions = serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Save the options to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

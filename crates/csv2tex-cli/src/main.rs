//! csv2tex CLI
//!
//! Command-line tool for converting CSV files into LaTeX tables.

use clap::{Parser, Subcommand};
use csv2tex_core::{
    convert_file, read_table_file, usepackage_line, ColumnAlign, FontSize, HeaderLayout,
    RaggedRows, RenderOptions, TableEnvironment,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "csv2tex")]
#[command(about = "Convert CSV files into LaTeX tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file into a LaTeX table
    Convert(ConvertArgs),

    /// Parse a CSV file and show what the converter sees
    Inspect {
        /// Path to CSV file
        input: PathBuf,

        /// Pad short rows instead of rejecting them
        #[arg(long)]
        allow_ragged: bool,

        /// Maximum number of rows to display
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create an options file template
    InitConfig {
        /// Output path for the options file
        #[arg(short, long)]
        output: PathBuf,

        /// Table caption
        #[arg(long)]
        caption: Option<String>,

        /// Table label
        #[arg(long)]
        label: Option<String>,

        /// Number of header lines
        #[arg(long)]
        header_lines: Option<usize>,

        /// Landscape orientation
        #[arg(long)]
        landscape: bool,
    },
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Path to CSV file
    input: PathBuf,

    /// Output .tex file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Options file (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of leading rows forming the header
    #[arg(long)]
    header_lines: Option<usize>,

    /// Header layout for multiple header lines (stacked or rows)
    #[arg(long)]
    header_layout: Option<HeaderLayout>,

    /// Wrap the table in a landscape environment
    #[arg(long)]
    landscape: bool,

    /// Keep portrait orientation even if the options file asks for landscape
    #[arg(long, conflicts_with = "landscape")]
    no_landscape: bool,

    /// Table caption
    #[arg(long)]
    caption: Option<String>,

    /// Table label
    #[arg(long)]
    label: Option<String>,

    /// Emit a page-breaking longtable instead of table/tabular
    #[arg(long)]
    longtable: bool,

    /// Emit table/tabular even if the options file selects longtable
    #[arg(long, conflicts_with = "longtable")]
    no_longtable: bool,

    /// Column alignment: left, center, right or p:<width>
    #[arg(long)]
    align: Option<ColumnAlign>,

    /// Use booktabs rules
    #[arg(long)]
    booktabs: bool,

    /// Use \hline rules even if the options file enables booktabs
    #[arg(long, conflicts_with = "booktabs")]
    no_booktabs: bool,

    /// Font size switch, e.g. footnotesize
    #[arg(long)]
    font_size: Option<FontSize>,

    /// Float placement, e.g. htbp
    #[arg(long)]
    placement: Option<String>,

    /// Render NA, N/A, ---, empty cells etc. as an em dash
    #[arg(long)]
    mark_missing: bool,

    /// Keep missing-value cells as written
    #[arg(long, conflicts_with = "mark_missing")]
    no_mark_missing: bool,

    /// Pad short rows instead of rejecting them
    #[arg(long)]
    allow_ragged: bool,

    /// Reject ragged rows even if the options file allows them
    #[arg(long, conflicts_with = "allow_ragged")]
    no_allow_ragged: bool,
}

/// Resolve a `--flag` / `--no-flag` pair; `None` leaves the loaded value alone
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

impl ConvertArgs {
    /// Options file (or defaults) overridden by command-line flags
    fn render_options(&self) -> csv2tex_core::Result<RenderOptions> {
        let mut options = match &self.config {
            Some(path) => RenderOptions::load(path)?,
            None => RenderOptions::default(),
        };

        if let Some(count) = self.header_lines {
            options.header_line_count = count;
        }
        if let Some(layout) = self.header_layout {
            options.header_layout = layout;
        }
        if let Some(landscape) = switch(self.landscape, self.no_landscape) {
            options.landscape = landscape;
        }
        if let Some(caption) = &self.caption {
            options.caption = Some(caption.clone());
        }
        if let Some(label) = &self.label {
            options.label = Some(label.clone());
        }
        if let Some(longtable) = switch(self.longtable, self.no_longtable) {
            options.environment = if longtable {
                TableEnvironment::Longtable
            } else {
                TableEnvironment::Tabular
            };
        }
        if let Some(align) = &self.align {
            options.align = align.clone();
        }
        if let Some(booktabs) = switch(self.booktabs, self.no_booktabs) {
            options.booktabs = booktabs;
        }
        if let Some(size) = self.font_size {
            options.font_size = Some(size);
        }
        if let Some(placement) = &self.placement {
            options.placement = Some(placement.clone());
        }
        if let Some(mark_missing) = switch(self.mark_missing, self.no_mark_missing) {
            options.mark_missing = mark_missing;
        }
        if let Some(allow) = switch(self.allow_ragged, self.no_allow_ragged) {
            options.ragged = if allow {
                RaggedRows::Pad
            } else {
                RaggedRows::Reject
            };
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Set up structured logging on stderr; `RUST_LOG` takes precedence
fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("csv2tex={0},csv2tex_core={0}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", level);
}

fn run(command: Commands) -> csv2tex_core::Result<()> {
    match command {
        Commands::Convert(args) => cmd_convert(&args),
        Commands::Inspect {
            input,
            allow_ragged,
            limit,
            format,
        } => cmd_inspect(&input, allow_ragged, limit, &format),
        Commands::InitConfig {
            output,
            caption,
            label,
            header_lines,
            landscape,
        } => cmd_init_config(&output, caption, label, header_lines, landscape),
    }
}

fn cmd_convert(args: &ConvertArgs) -> csv2tex_core::Result<()> {
    let options = args.render_options()?;
    debug!(?options, "render options");

    let report = convert_file(&args.input, args.output.as_deref(), &options)?;

    match &report.output {
        Some(path) => {
            eprintln!(
                "Wrote {} columns, {} header line(s), {} rows to {}",
                report.columns,
                report.header_rows,
                report.body_rows,
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.text.as_bytes())?;
            stdout.flush()?;
        }
    }

    if let Some(line) = usepackage_line(&options) {
        eprintln!("Required LaTeX packages: {}", line);
    }

    Ok(())
}

fn cmd_inspect(input: &Path, allow_ragged: bool, limit: usize, format: &str) -> csv2tex_core::Result<()> {
    let ragged = if allow_ragged {
        RaggedRows::Pad
    } else {
        RaggedRows::Reject
    };
    let table = read_table_file(input, ragged)?;

    match format.to_lowercase().as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&table)?;
            println!("{}", json);
        }
        "text" => {
            println!("File: {}", input.display());
            println!("Encoding: {}", table.encoding);
            println!("Columns: {}", table.column_count());
            println!("Rows: {}", table.row_count());
            println!();

            for row in table.rows.iter().take(limit) {
                println!("{:>4}  {}", row.index, row.fields.join("\t"));
            }

            if table.row_count() > limit {
                println!("... ({} more rows)", table.row_count() - limit);
            }
        }
        _ => {
            return Err(csv2tex_core::Error::InvalidOptions(format!(
                "unknown format '{}', supported formats: text, json",
                format
            )));
        }
    }

    Ok(())
}

fn cmd_init_config(
    output: &Path,
    caption: Option<String>,
    label: Option<String>,
    header_lines: Option<usize>,
    landscape: bool,
) -> csv2tex_core::Result<()> {
    let mut options = RenderOptions::new().with_landscape(landscape);
    options.caption = caption;
    options.label = label;
    if let Some(count) = header_lines {
        options.header_line_count = count;
    }
    options.validate()?;

    options.save(output)?;
    println!("Created options file: {}", output.display());
    println!();
    println!("Edit the file to adjust the table layout, then run:");
    println!("  csv2tex convert <input.csv> --config {} -o <output.tex>", output.display());

    Ok(())
}

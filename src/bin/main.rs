//! bupstats CLI - Tree-size reports over a bup statistics database
//!
//! Usage:
//!   bupstats report [--db <path>] [--threshold <n>] [--format html|text|json] [--output <file>]
//!   bupstats tree-sizes [--db <path>]
//!   bupstats parents <sha> [--db <path>]
//!   bupstats serve [--db <path>] [--port <port>]     (feature "serve")
//!
//! Examples:
//!   bupstats report --db ~/.bup/bupstats-partial.sqlite3 > stats.html
//!   bupstats report --format text --threshold 50
//!   bupstats parents 4b825dc642cb6eb9a060e54bf8d69288fbee4904

use bupstats::config::Settings;
use bupstats::dataset::Dataset;
use bupstats::render::{self, Format};
use bupstats::report::generate_report;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "bupstats")]
#[command(about = "bupstats - Tree-size and fan-out reports over a bup statistics database")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $BUPSTATS_CONFIG, ./bupstats.toml, ~/.config/bupstats/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the fan-out histogram and child-count ranking
    Report {
        /// Path to the statistics database
        #[arg(long)]
        db: Option<PathBuf>,

        /// Minimum child count for the ranking table
        #[arg(short, long)]
        threshold: Option<u64>,

        /// Output format
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every tree with its number of entries
    TreeSizes {
        /// Path to the statistics database
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show the objects that reference a hash
    Parents {
        /// Hash of the child object
        sha: String,

        /// Path to the statistics database
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Serve the report over HTTP
    #[cfg(feature = "serve")]
    Serve {
        /// Path to the statistics database
        #[arg(long)]
        db: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    /// HTML page
    Html,
    /// Aligned text tables
    Text,
    /// Pretty-printed JSON
    Json,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => Format::Html,
            FormatArg::Text => Format::Text,
            FormatArg::Json => Format::Json,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Report {
            db,
            threshold,
            format,
            output,
        } => cmd_report(&settings, db, threshold, format, output),
        Commands::TreeSizes { db } => cmd_tree_sizes(&settings, db),
        Commands::Parents { sha, db } => cmd_parents(&settings, db, &sha),
        #[cfg(feature = "serve")]
        Commands::Serve { db, port } => cmd_serve(&settings, db, port),
    }
}

/// The `--db` argument if given, else the configured or default path.
fn resolve_dataset_path(settings: &Settings, db: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = db {
        return Some(path);
    }
    match settings.dataset_path() {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            None
        }
    }
}

fn open_dataset(path: &Path) -> Option<Dataset> {
    match Dataset::open(path) {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn write_output(rendered: &str, output: Option<&Path>) -> std::io::Result<()> {
    let mut rendered = rendered.to_string();
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    match output {
        Some(path) => fs::write(path, rendered),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn cmd_report(
    settings: &Settings,
    db: Option<PathBuf>,
    threshold: Option<u64>,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
) -> ExitCode {
    let Some(path) = resolve_dataset_path(settings, db) else {
        return ExitCode::FAILURE;
    };
    let Some(dataset) = open_dataset(&path) else {
        return ExitCode::FAILURE;
    };

    let mut options = settings.report_options();
    if let Some(threshold) = threshold {
        options = options.with_threshold(threshold);
    }
    let format = format.map(Format::from).unwrap_or(settings.report.format);

    let report = match generate_report(&dataset, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Report error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    drop(dataset);

    let source = path.display().to_string();
    let rendered = match render::render(&report, format, Some(&source)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Render error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(&rendered, output.as_deref()) {
        eprintln!("Error writing report: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn cmd_tree_sizes(settings: &Settings, db: Option<PathBuf>) -> ExitCode {
    let Some(path) = resolve_dataset_path(settings, db) else {
        return ExitCode::FAILURE;
    };
    let Some(dataset) = open_dataset(&path) else {
        return ExitCode::FAILURE;
    };

    match dataset.tree_sizes() {
        Ok(sizes) => {
            print!("{}", render::tree_sizes_text(&sizes));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_parents(settings: &Settings, db: Option<PathBuf>, sha: &str) -> ExitCode {
    let Some(path) = resolve_dataset_path(settings, db) else {
        return ExitCode::FAILURE;
    };
    let Some(dataset) = open_dataset(&path) else {
        return ExitCode::FAILURE;
    };

    match dataset.parents_of(sha) {
        Ok(parents) => {
            print!("{}", render::parents_text(sha, &parents));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "serve")]
fn cmd_serve(settings: &Settings, db: Option<PathBuf>, port: Option<u16>) -> ExitCode {
    use bupstats::web::{self, AppState};
    use std::time::Duration;

    let Some(path) = resolve_dataset_path(settings, db) else {
        return ExitCode::FAILURE;
    };

    let state = AppState {
        dataset_path: path,
        options: settings.report_options(),
        request_timeout: Duration::from_secs(settings.server.request_timeout_secs),
    };
    let port = port.unwrap_or(settings.server.port);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::serve(state, port)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

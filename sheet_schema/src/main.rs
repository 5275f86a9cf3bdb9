use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use sheet_schema::config::{self, Config};
use sheet_schema::utils::logging::init_logging;
use sheet_schema::{Exporter, OutputFormat, Workbook};

#[derive(Parser, Debug)]
#[command(name = "sheet_schema", version, about = "Convert spreadsheet schema sheets to DBML or diagram JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Emit DBML text
    Dbml(ExportArgs),
    /// Emit diagram JSON
    Json(ExportArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Workbook JSON exported from the spreadsheet host
    #[arg(short, long, conflicts_with = "csv")]
    input: Option<PathBuf>,

    /// CSV files, one sheet each (no colors available)
    #[arg(long, num_args = 1..)]
    csv: Vec<PathBuf>,

    /// Configuration file (TOML, or YAML by extension)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exit with status 2 when any warning was reported
    #[arg(long)]
    deny_warnings: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let (format, args) = match cli.command {
        Command::Dbml(args) => (OutputFormat::Dbml, args),
        Command::Json(args) => (OutputFormat::Json, args),
    };

    let config = match &args.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => Config::default(),
    };
    init_logging(&config.logging).context("Failed to initialise logging")?;

    let workbook = match (&args.input, args.csv.is_empty()) {
        (Some(path), _) => Workbook::from_json_file(path)
            .with_context(|| format!("Failed to read workbook {}", path.display()))?,
        (None, false) => Workbook::from_csv_files(&args.csv).context("Failed to read CSV sheets")?,
        (None, true) => bail!("Provide a workbook with --input or sheets with --csv"),
    };

    let export = Exporter::new(&config).export(&workbook, format)?;

    match &args.output {
        Some(path) => fs::write(path, &export.content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", export.content),
    }

    let warnings = export.warnings().count();
    if warnings > 0 {
        eprintln!(
            "{} warning(s), {} diagnostic(s) in total",
            warnings,
            export.diagnostics.len()
        );
    }

    if args.deny_warnings && export.has_warnings() {
        return Ok(2);
    }
    Ok(0)
}

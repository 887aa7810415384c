//! CLI tool for querying German bank code files.
//!
//! # Usage
//!
//! ```bash
//! # Head office of a bank code
//! blz --config bankdata.json lookup 10020030
//!
//! # Branch offices as JSON
//! blz --config bankdata.json --json branches 10020030
//!
//! # Banks in Hamburg whose name contains "sparkasse"
//! blz search --name sparkasse --city hamburg
//!
//! # Merge all configured files into one current file
//! blz merge --output blz_merged.txt
//!
//! # Reformat a value
//! blz format --kind account-number --style letter 1234567890
//! ```
//!
//! Set `RUST_LOG=info` to see what is loaded.

use std::fs::File;
use std::io::{Write, stdout};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bankdata::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

/// Query German bank code files.
///
/// Bank code files and their validity dates are listed in a JSON
/// configuration file; all files are merged in order before a query.
#[derive(Parser, Debug)]
#[command(name = "blz")]
#[command(version, about)]
struct Args {
    /// Configuration file listing the bank code files.
    #[arg(short, long, global = true, default_value = "bankdata.json")]
    config: PathBuf,

    /// Print records as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the head office of a bank code.
    Lookup {
        /// Bank code, with or without the space after the fourth digit.
        code: String,
    },
    /// List the branch offices of a bank code.
    Branches {
        /// Bank code, with or without the space after the fourth digit.
        code: String,
    },
    /// Search banks by name, postal code and city (case-insensitive).
    Search {
        /// Part of the bank name.
        #[arg(long)]
        name: Option<String>,
        /// Part of the postal code.
        #[arg(long)]
        postal_code: Option<String>,
        /// Part of the city.
        #[arg(long)]
        city: Option<String>,
        /// Include branch offices.
        #[arg(long)]
        branches: bool,
    },
    /// Show validity and size of the merged bank data.
    Info,
    /// Merge all configured files and write the current records.
    Merge {
        /// Output file path. If not specified, writes to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a value and print it in the requested style.
    Format {
        /// Kind of value.
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Output style: electronic or letter.
        #[arg(long, default_value = "electronic")]
        style: FormatStyle,
        /// Value to format.
        value: String,
    },
}

/// Value kinds for the `format` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    /// Eight digit bank code.
    BankCode,
    /// Account number with up to ten digits.
    AccountNumber,
    /// Reference number with up to ten digits.
    Reference10,
    /// Reference number with up to eleven digits.
    Reference11,
    /// DTAUS text, normalized to the allowed alphabet.
    Text,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let mut out = stdout().lock();

    match args.command {
        Command::Lookup { code } => {
            let directory = open_directory(&args.config)?;
            let code = parse_code(&code)?;
            let Some(record) = directory.head_office(code)? else {
                bail!("Unknown bank code {code}");
            };
            print_records(&mut out, std::slice::from_ref(&record), args.json)?;
        }
        Command::Branches { code } => {
            let directory = open_directory(&args.config)?;
            let code = parse_code(&code)?;
            let records = directory.branch_offices(code)?;
            print_records(&mut out, &records, args.json)?;
        }
        Command::Search { name, postal_code, city, branches } => {
            let directory = open_directory(&args.config)?;
            let query = SearchQuery { name, postal_code, city, include_branch_offices: branches };
            let records = directory.search(&query)?;
            print_records(&mut out, &records, args.json)?;
        }
        Command::Info => {
            let directory = open_directory(&args.config)?;
            let snapshot = directory.snapshot()?;
            print_info(&mut out, &snapshot, args.json)?;
        }
        Command::Merge { output } => {
            let config = load_config(&args.config)?;
            let file = merge(&config)?;
            let count = match &output {
                Some(path) => {
                    let target = File::create(path).with_context(|| {
                        format!("Failed to create output file: {}", path.display())
                    })?;
                    file.write(target, config.directory.encoding)?
                }
                None => file.write(&mut out, config.directory.encoding)?,
            };
            eprintln!("Merged {} file(s), wrote {count} record(s)", config.resources.len());
        }
        Command::Format { kind, style, value } => {
            writeln!(out, "{}", format_value(kind, style, &value)?)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<BankDataConfig> {
    BankDataConfig::load(path)
        .with_context(|| format!("Failed to load configuration: {}", path.display()))
}

fn open_directory(path: &Path) -> Result<BankDirectory> {
    let config = load_config(path)?;
    let provider = FileProvider::from_config(&config);
    BankDirectory::open(provider, config.directory).context("Failed to load bank data")
}

fn parse_code(text: &str) -> Result<BankCode> {
    BankCode::parse(text.trim()).with_context(|| format!("Invalid bank code '{text}'"))
}

/// Reads and merges all configured files in order.
fn merge(config: &BankDataConfig) -> Result<BankFile> {
    let provider = FileProvider::from_config(config);
    let merged = BankFile::merge_all(&provider, config.directory.encoding)
        .context("Failed to merge bank files")?;
    let file = merged.context("No bank files configured")?;
    info!(files = provider.resource_count(), records = file.len(), "bank files merged");
    Ok(file)
}

fn format_value(kind: KindArg, style: FormatStyle, value: &str) -> Result<String> {
    let formatted = match kind {
        KindArg::BankCode => BankCode::parse(value)?.format(style),
        KindArg::AccountNumber => AccountNumber::parse(value)?.format(style),
        KindArg::Reference10 => ReferenceNumber10::parse(value)?.format(style),
        KindArg::Reference11 => ReferenceNumber11::parse(value)?.format(style),
        KindArg::Text => AlphaNumericText27::parse_normalized(value)?.as_str().to_string(),
    };
    Ok(formatted)
}

fn render(record: &BankRecord) -> String {
    let office = if record.head_office { "head office" } else { "branch" };
    let mut line = format!(
        "{} {:06} {office:<11} {}, {:05} {}",
        record.bank_code, record.serial_number, record.name, record.postal_code, record.city
    );
    if let Some(bic) = &record.bic {
        line.push_str(&format!(" (BIC {bic})"));
    }
    line
}

fn print_records(out: &mut impl Write, records: &[BankRecord], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, records)?;
        writeln!(out)?;
    } else {
        for record in records {
            writeln!(out, "{}", render(record))?;
        }
    }
    Ok(())
}

fn print_info(out: &mut impl Write, snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        let info = serde_json::json!({
            "format": snapshot.format(),
            "date_of_validity": snapshot.date_of_validity(),
            "date_of_expiration": snapshot.date_of_expiration(),
            "records": snapshot.record_count(),
        });
        serde_json::to_writer_pretty(&mut *out, &info)?;
        writeln!(out)?;
        return Ok(());
    }
    match (snapshot.format(), snapshot.date_of_validity(), snapshot.date_of_expiration()) {
        (Some(format), Some(validity), Some(expiration)) => {
            writeln!(out, "Format:     {format}")?;
            writeln!(out, "Valid:      {validity} to {expiration}")?;
            writeln!(out, "Records:    {}", snapshot.record_count())?;
        }
        _ => writeln!(out, "No bank data configured")?,
    }
    Ok(())
}

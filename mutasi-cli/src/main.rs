use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mutasi_core::ParseResult;
use mutasi_export::export_to_csv;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod extract;
mod report;

#[derive(Parser, Debug)]
#[command(
    name = "mutasi",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MUTASI_BUILD_SHA"), ")"),
    about = "Parse bank statement PDFs into transactions and reconcile them"
)]
struct Cli {
    /// Debug logging on stderr (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Layout TOML added to the built-ins (replaces a built-in of the same bank)
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement (PDF or JSON token dump) and print a report
    Parse {
        input: PathBuf,

        /// Write metadata and transaction CSVs
        #[arg(short, long, num_args = 2, value_names = ["META", "TX"])]
        output: Option<Vec<PathBuf>>,

        /// Force a layout by bank name instead of auto-detection
        #[arg(long)]
        bank: Option<String>,

        /// Print the full result as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Exit non-zero when reconciliation fails
        #[arg(long)]
        strict: bool,
    },

    /// Dump a PDF's extracted tokens as JSON (fixture capture)
    Tokens {
        pdf: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported banks
    Banks,

    /// Print a layout as TOML (a starting point for --layout)
    Layout {
        #[arg(long, default_value = "BRI")]
        bank: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse {
            input,
            output,
            bank,
            json,
            strict,
        } => {
            let result = run_parse(&input, output.as_deref(), cli.layout.as_deref(), bank.as_deref())?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("serialize result")?
                );
            } else {
                print!("{}", report::render(&result).context("render report")?);
            }
            if strict {
                ensure_reconciled(&result)?;
            }
        }

        Command::Tokens { pdf, output } => {
            let document = extract::extract_pdf(&pdf)?;
            let json = serde_json::to_string_pretty(&document).context("serialize tokens")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
                    eprintln!(
                        "Wrote {} tokens on {} pages to {}",
                        document.token_count(),
                        document.pages.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }

        Command::Banks => {
            for bank in config::registry(cli.layout.as_deref())?.supported_banks() {
                println!("{bank}");
            }
        }

        Command::Layout { bank } => {
            let registry = config::registry(cli.layout.as_deref())?;
            let parser = config::parser_for_bank(&registry, &bank)?;
            print!("{}", config::layout_to_toml(parser.layout())?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load, parse and optionally export one statement.
fn run_parse(
    input: &Path,
    output: Option<&[PathBuf]>,
    layout: Option<&Path>,
    bank: Option<&str>,
) -> Result<ParseResult> {
    let document = extract::load_document(input)?;
    let registry = config::registry(layout)?;

    let result = match bank {
        Some(bank) => config::parser_for_bank(&registry, bank)?.parse(&document),
        None => registry.parse(&document),
    }
    .with_context(|| format!("parsing {}", input.display()))?;

    if let Some([meta, tx]) = output {
        export_to_csv(&result, meta, tx).context("export csv")?;
        eprintln!("Wrote {} and {}", meta.display(), tx.display());
    }

    Ok(result)
}

/// Error when any reconciliation check failed or the running balance broke.
fn ensure_reconciled(result: &ParseResult) -> Result<()> {
    if result.reconciliation.is_reconciled() {
        return Ok(());
    }
    let failed: Vec<&str> = result
        .reconciliation
        .failures()
        .map(|c| c.key.as_str())
        .collect();
    bail!(
        "reconciliation failed (checks: [{}], balance breaks: {})",
        failed.join(", "),
        result.reconciliation.balance_breaks.len()
    );
}

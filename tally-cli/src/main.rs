use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::build_report;
use tally_ingest::{format_money, parse_statement, MismatchPolicy, ParseOptions, ParseOutcome};
use tracing::info;

mod config;
mod input;
mod logging;
mod state;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Extract and reconcile transaction ledgers from statement text")]
struct Cli {
    /// Enable debug output
    #[arg(long, short, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse extracted statement text and write the budget report
    Parse {
        /// Page text: one file with form-feed page breaks, one file per page,
        /// or a directory of *.txt pages
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Statement year, used to print full transaction dates
        #[arg(long)]
        year: Option<i32>,

        /// Report path (default from config: /tmp/tally-report.json)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Key the ledger is filed under in the report (default: capital_one)
        #[arg(long)]
        issuer: Option<String>,

        /// Print the report to stdout
        #[arg(long, short)]
        print: bool,

        /// Fail when a holder's transactions do not add up to the statement total
        #[arg(long)]
        strict: bool,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Parse {
            inputs,
            year,
            report,
            issuer,
            print,
            strict,
        } => {
            let level = if cli.debug { "debug" } else { cfg.log.level.as_str() };
            logging::init_logging(level, cfg.log.path.as_deref())?;

            let options = ParseOptions {
                mismatch_policy: if strict {
                    MismatchPolicy::Abort
                } else {
                    cfg.parse.mismatch_policy
                },
            };
            let report_path = report.unwrap_or_else(|| cfg.report.path.clone());
            let issuer = issuer.unwrap_or_else(|| cfg.report.issuer.clone());

            run_parse(&inputs, options, year, &issuer, &report_path, print)?;

            if let Some(log) = &cfg.log.path {
                println!("Log: {}", log.display());
            }
            println!("Transactions report: {}", report_path.display());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn run_parse(
    inputs: &[PathBuf],
    options: ParseOptions,
    year: Option<i32>,
    issuer: &str,
    report_path: &Path,
    print: bool,
) -> Result<()> {
    let names = inputs
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    info!(inputs = %names, "analyzing statement text");

    let statement = input::load_statement(inputs)?;
    info!(pages = statement.page_count(), "loaded statement");

    let outcome = parse_statement(&statement, options)
        .with_context(|| format!("parsing {names}"))?;

    print_summary(&outcome, year);

    let report = build_report(issuer, &outcome)?;
    let json = report.to_json_pretty()?;
    if print {
        println!("{json}");
    }
    fs::write(report_path, &json).with_context(|| format!("write {}", report_path.display()))?;
    Ok(())
}

fn print_summary(outcome: &ParseOutcome, year: Option<i32>) {
    println!(
        "Parsed {} transactions for {} account holder(s)\n",
        outcome.ledger.transaction_count(),
        outcome.ledger.len()
    );

    for section in outcome.ledger.sections() {
        println!(
            "{} #{} | count={} | total={} | {}",
            section.holder(),
            section.account(),
            section.transactions_count(),
            format_money(section.total()),
            if section.is_verified() { "verified" } else { "UNVERIFIED" }
        );

        if let Some(year) = year {
            for txn in section.transactions() {
                let dates = txn
                    .resolve_dates(year)
                    .map(|(t, p)| format!("{t} {p}"))
                    .unwrap_or_else(|| format!("{} {}", txn.transaction_date, txn.post_date));
                println!("  {dates}  {:<40} {:>12}", txn.description, format_money(txn.amount));
            }
        }
    }

    for d in &outcome.discrepancies {
        println!("\nwarning: {d}");
    }
    for holder in &outcome.unclosed {
        println!("\nwarning: {holder}: no total line found, amounts unverified");
    }
    println!();
}

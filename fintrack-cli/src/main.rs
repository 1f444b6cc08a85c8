use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use fintrack_core::{Direction, normalize_keyword};
use fintrack_finance::{CategorizedBatch, CategoryStore, CorrectionOutcome};
use fintrack_ingest::parse_statement_csv;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod report;
mod state;

use config::Config;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FINTRACK_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "fintrack",
    version,
    long_version = LONG_VERSION,
    about = "Categorize bank statements with a keyword dictionary that learns from your corrections"
)]
struct Cli {
    /// Category dictionary to use instead of the configured one
    #[arg(long, global = true)]
    categories: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.fintrack/config.toml
    Init,

    /// Categorize a statement and print totals and per-category summaries
    #[command(alias = "import")]
    Report {
        /// Statement CSV (Date, Details, Amount, Debit/Credit)
        #[arg(long)]
        csv: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a statement's rows with their ids and categories
    Transactions {
        #[arg(long)]
        csv: PathBuf,

        /// Only show one direction
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },

    /// Recategorize rows of a statement and learn from the changes
    Correct {
        #[arg(long)]
        csv: PathBuf,

        /// Correction as ROW=CATEGORY (repeatable; applied in order)
        #[arg(long = "set", value_name = "ROW=CATEGORY", value_parser = parse_correction, required = true)]
        set: Vec<(usize, String)>,
    },
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// Show every category and its learned keywords
    List,

    /// Create an empty category
    Add { name: String },

    /// Delete a category and forget its keywords
    Remove { name: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DirectionArg {
    Debit,
    Credit,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Debit => Direction::Debit,
            DirectionArg::Credit => Direction::Credit,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > warn
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    if let Command::Init = cli.command {
        return config::init_config();
    }

    let cfg = config::load_config()?;
    let categories_path = match cli.categories {
        Some(p) => p,
        None => cfg.categories_path()?,
    };
    info!(path = %categories_path.display(), "Opening category dictionary");
    let mut store = CategoryStore::open_path(&categories_path);
    let currency = cfg.display.currency.as_str();

    match cli.command {
        Command::Init => {}

        Command::Report { csv, json } => {
            let batch = load_batch(&csv, &cfg, &store)?;
            let summary = batch.summary();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Parsed {} transactions from {}\n", batch.len(), csv.display());
            report::print_totals(&summary.totals, currency);
            report::print_category_summary("Expense Summary", &summary.expenses, currency);
            report::print_category_summary("Income Summary", &summary.income, currency);

            println!("\n## Income Details\n");
            report::print_transactions(&batch.income, currency);

            let uncategorized = batch.expenses.iter().filter(|t| t.is_uncategorized()).count();
            if uncategorized > 0 {
                println!(
                    "\n{} expenses are uncategorized. Teach them with: fintrack correct --csv {} --set <ROW>=<CATEGORY>",
                    uncategorized,
                    csv.display()
                );
            }
        }

        Command::Transactions { csv, direction } => {
            let batch = load_batch(&csv, &cfg, &store)?;
            let wanted: Option<Direction> = direction.map(Into::into);
            report::print_transactions(
                batch.iter().filter(|t| wanted.is_none_or(|d| t.direction == d)),
                currency,
            );
        }

        Command::Categories { command } => match command {
            CategoriesCommand::List => {
                for (name, keywords) in store.dictionary().iter() {
                    println!("{} ({} keywords)", name, keywords.len());
                    for kw in keywords {
                        println!("  - {}", kw);
                    }
                }
            }
            CategoriesCommand::Add { name } => {
                if store.create_category(&name)? {
                    println!("Created category {:?}", name.trim());
                } else {
                    println!("Category {:?} already exists", name.trim());
                }
            }
            CategoriesCommand::Remove { name } => {
                store.delete_category(&name)?;
                println!("Removed category {:?}", name);
            }
        },

        Command::Correct { csv, set } => {
            let mut batch = load_batch(&csv, &cfg, &store)?;
            let outcomes = batch
                .apply_corrections(&set, &mut store)
                .context("applying corrections")?;

            for ((id, category), outcome) in set.iter().zip(&outcomes) {
                let details = batch.get(*id).map(|t| t.details.as_str()).unwrap_or("");
                match outcome {
                    CorrectionOutcome::Unchanged => {
                        println!("row {id}: already {category}");
                    }
                    CorrectionOutcome::Learned { learned: true } => {
                        println!("row {id}: -> {category} (learned {:?})", normalize_keyword(details));
                    }
                    CorrectionOutcome::Learned { learned: false } => {
                        println!("row {id}: -> {category}");
                    }
                    CorrectionOutcome::Unlearned { previous_owner } => match previous_owner {
                        Some(prev) => println!("row {id}: -> {category} (forgot keyword from {prev})"),
                        None => println!("row {id}: -> {category}"),
                    },
                }
            }

            if outcomes.iter().any(CorrectionOutcome::persisted) {
                println!("\nSaved {}", categories_path.display());
            } else {
                println!("\nNo dictionary changes");
            }
            report::print_category_summary("Expense Summary", &batch.summary().expenses, currency);
        }
    }

    Ok(())
}

/// Parse and classify one statement; any bad row aborts the whole batch
fn load_batch(csv: &Path, cfg: &Config, store: &CategoryStore) -> Result<CategorizedBatch> {
    if !csv.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", csv.display());
    }
    let txns = parse_statement_csv(csv, &cfg.import_options())
        .with_context(|| format!("Failed to load file {}", csv.display()))?;
    Ok(CategorizedBatch::classify(txns, store.dictionary()))
}

fn parse_correction(s: &str) -> std::result::Result<(usize, String), String> {
    let (row, category) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=CATEGORY, got {s:?}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("bad row {row:?}: {e}"))?;
    let category = category.trim();
    if category.is_empty() {
        return Err(format!("missing category in {s:?}"));
    }
    Ok((row, category.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_correction() {
        assert_eq!(parse_correction("3=Dining").unwrap(), (3, "Dining".to_string()));
        assert_eq!(parse_correction(" 12 = Eating Out ").unwrap(), (12, "Eating Out".to_string()));
        assert!(parse_correction("Dining").is_err());
        assert!(parse_correction("x=Dining").is_err());
        assert!(parse_correction("4=").is_err());
    }

    #[test]
    fn test_cli_parses_repeated_corrections() {
        let cli = Cli::try_parse_from([
            "fintrack", "correct", "--csv", "march.csv", "--set", "0=Rent", "--set", "2=Dining",
        ])
        .unwrap();
        match cli.command {
            Command::Correct { set, .. } => {
                assert_eq!(set, vec![(0, "Rent".to_string()), (2, "Dining".to_string())]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_import_alias() {
        let cli = Cli::try_parse_from(["fintrack", "import", "--csv", "march.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Report { json: false, .. }));
    }

    #[test]
    fn test_categories_flag_is_global() {
        let cli = Cli::try_parse_from(["fintrack", "categories", "list", "--categories", "/tmp/c.json"]).unwrap();
        assert_eq!(cli.categories, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn test_long_version_carries_revision() {
        assert!(LONG_VERSION.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(LONG_VERSION.ends_with(')'));
        assert!(!env!("FINTRACK_BUILD_SHA").is_empty());
    }
}

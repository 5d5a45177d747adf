use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sales_report::{RecordTable, DEFAULT_FILENAME, DEFAULT_PREVIEW_ROWS};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sales-report")]
#[command(about = "Turn a sales CSV into a formatted Excel report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the first rows of a sales CSV as JSON
    Preview {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },
    /// Generate the Excel report
    Generate {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = DEFAULT_FILENAME)]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview { csv, rows } => {
            let table = load_table(&csv)?;
            let preview = sales_report::preview(&table, rows);
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        Commands::Generate { csv, out } => {
            let table = load_table(&csv)?;
            let report = sales_report::generate(&table)
                .with_context(|| format!("failed to build report from {}", csv.display()))?;
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Report with {} records written to {}.",
                table.len(),
                out.display()
            );
        }
    }

    Ok(())
}

fn load_table(csv: &Path) -> anyhow::Result<RecordTable> {
    let bytes =
        std::fs::read(csv).with_context(|| format!("failed to read {}", csv.display()))?;
    sales_report::load(&bytes).with_context(|| format!("failed to load {}", csv.display()))
}

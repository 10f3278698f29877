use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cu_lookup::config::LookupConfig;
use cu_lookup::export::{export_breakdown, export_file_name};
use cu_lookup::ingestion::locate;
use cu_lookup::observability::SearchAuditLog;
use cu_lookup::{load_relations, render, selected_cu, CuLookup, CuLookupResult};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// CU lookup: search listings, expand a CU into its stock codes
#[derive(Parser)]
#[command(name = "cu-lookup")]
#[command(about = "Expand CUs into described stock codes")]
struct Args {
    /// Directory holding the listing, breakdown and description CSVs
    /// (or set CU_LOOKUP_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Search audit log file (or set CU_LOOKUP_AUDIT_LOG)
    #[arg(long, global = true)]
    audit_log: Option<PathBuf>,

    /// JSON file overriding the source file name patterns
    #[arg(long, global = true)]
    sources: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Case-insensitive search across every listing column
    Search { query: String },

    /// Search, then show details for one result
    Select {
        query: String,

        /// Row number from the search results
        #[arg(short, long)]
        index: usize,
    },

    /// Show the legend and stock code breakdown of a CU
    Show { cu: String },

    /// Write the breakdown of a CU as CSV
    Export {
        cu: String,

        /// Output file (default: CU_<cu>_breakdown.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = LookupConfig::from_env(args.data_dir, args.audit_log, args.sources.as_deref())?;

    let paths = locate(&config.data_dir, &config.patterns)
        .context("One or more CSV files are missing; check the data directory")?;
    let store = load_relations(&paths)?;
    let audit = SearchAuditLog::new(Some(config.audit_log.clone()), 1000);
    let lookup = CuLookup::with_audit(&store, &audit);

    match args.command {
        Command::Search { query } => {
            let results = lookup.search(&query);
            if results.is_empty() {
                println!("No search results.");
            } else {
                println!("=== Search Results ===");
                print!("{}", render::listings(&results));
            }
        }
        Command::Select { query, index } => {
            let results = lookup.search(&query);
            let Some(record) = results.get(index) else {
                bail!("No search result #{} ({} results for '{}')", index, results.len(), query);
            };
            let Some(cu) = selected_cu(record) else {
                bail!("Search result #{} has no CU code", index);
            };
            show(&lookup, &cu)?;
        }
        Command::Show { cu } => show(&lookup, &cu)?,
        Command::Export { cu, output } => {
            let result = lookup_or_report(&lookup, &cu)?;
            let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(&result.cu_id)));
            export_breakdown(&output, &result)?;
            println!("Breakdown written to {}", output.display());
        }
    }

    Ok(())
}

fn lookup_or_report(lookup: &CuLookup<'_>, cu: &str) -> Result<CuLookupResult> {
    lookup.lookup_cu(cu).map_err(|e| {
        error!("Lookup failed for CU {}: {}", cu, e);
        anyhow::Error::new(e).context(format!("Cannot expand CU {}", cu))
    })
}

fn show(lookup: &CuLookup<'_>, cu: &str) -> Result<()> {
    let result = lookup_or_report(lookup, cu)?;
    info!("Showing CU {}", result.cu_id);
    println!("Selected CU: {}\n", result.cu_id);

    if result.legend.is_empty() {
        println!("No CU legend found in listings for this CU.");
    } else {
        println!("=== CU Legend ===");
        let legend: Vec<_> = result.legend.iter().collect();
        print!("{}", render::listings(&legend));
    }
    println!();

    if result.breakdown.is_empty() {
        println!("No SC breakdown data found for this CU.");
    } else {
        println!("=== SC Breakdown Details ===");
        print!("{}", render::breakdown(&result));
    }
    Ok(())
}

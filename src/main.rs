use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use nvd_ingest::config::Config;
use nvd_ingest::constants;
use nvd_ingest::error::Result;
use nvd_ingest::fetch::{FetchOptions, NvdClient};
use nvd_ingest::logging;
use nvd_ingest::pipeline::Pipeline;
use nvd_ingest::storage::{ClickHouseStore, InMemoryStore, VulnerabilityStore};
use nvd_ingest::tasks;

#[derive(Parser)]
#[command(name = "nvd_ingest")]
#[command(about = "NVD CVE feed flattener and ClickHouse loader")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch raw records from the feed and write the handoff artifact
    Fetch {
        #[arg(long, default_value = constants::NVD_API_URL)]
        api_url: String,
        /// Pagination offset to start from
        #[arg(long, default_value_t = constants::DEFAULT_START_INDEX)]
        start_index: u64,
        #[arg(long, default_value_t = constants::DEFAULT_PAGE_SIZE)]
        page_size: u64,
        /// Stop after this many records
        #[arg(long, default_value_t = constants::DEFAULT_MAX_RECORDS)]
        max_records: usize,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Flatten a raw-record artifact into flat rows
    Transform {
        /// Raw-record artifact written by the fetch stage (consumed)
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Load a flat-row artifact into ClickHouse
    Load {
        /// Flat-row artifact written by the transform stage (consumed)
        #[arg(long)]
        input: PathBuf,
        /// Destination table override (database.table)
        #[arg(long)]
        table: Option<String>,
    },
    /// Run fetch, transform, and load as one in-process pipeline
    Run {
        #[arg(long, default_value = constants::NVD_API_URL)]
        api_url: String,
        #[arg(long, default_value_t = constants::DEFAULT_START_INDEX)]
        start_index: u64,
        #[arg(long, default_value_t = constants::DEFAULT_PAGE_SIZE)]
        page_size: u64,
        #[arg(long, default_value_t = constants::DEFAULT_MAX_RECORDS)]
        max_records: usize,
        /// Load into an in-memory store instead of ClickHouse
        #[arg(long)]
        dry_run: bool,
        /// Destination table override (database.table)
        #[arg(long)]
        table: Option<String>,
    },
}

fn clickhouse_store(table: Option<String>) -> Result<ClickHouseStore> {
    let mut config = Config::load()?.clickhouse;
    if let Some(table) = table {
        config.table = table;
    }
    Ok(ClickHouseStore::new(config))
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            api_url,
            start_index,
            page_size,
            max_records,
            out_dir,
        } => {
            println!("📡 Fetching records from {api_url}...");
            let client = NvdClient::new(api_url);
            let opts = FetchOptions {
                start_index,
                page_size,
                max_records,
            };
            match tasks::fetch_data_task(&client, &opts, &out_dir).await {
                Ok(path) => println!("💾 Raw records written to {}", path.display()),
                Err(e) => {
                    error!("Fetch stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Transform { input, out_dir } => {
            println!("🔧 Flattening {}...", input.display());
            match tasks::transform_data_task(&input, &out_dir) {
                Ok(path) => println!("💾 Flat rows written to {}", path.display()),
                Err(e) => {
                    error!("Transform stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Load { input, table } => {
            println!("💾 Loading {}...", input.display());
            let store = clickhouse_store(table)?;
            match tasks::save_data_task(&input, &store).await {
                Ok(summary) => println!("✅ Inserted {} rows", summary.rows_inserted),
                Err(e) => {
                    error!("Load stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Run {
            api_url,
            start_index,
            page_size,
            max_records,
            dry_run,
            table,
        } => {
            let client = NvdClient::new(api_url);
            let opts = FetchOptions {
                start_index,
                page_size,
                max_records,
            };
            let store: Box<dyn VulnerabilityStore> = if dry_run {
                Box::new(InMemoryStore::new())
            } else {
                Box::new(clickhouse_store(table)?)
            };

            match Pipeline::run(&client, &opts, store.as_ref()).await {
                Ok(result) => {
                    println!("\n📊 Pipeline results for run {}:", result.run_id);
                    println!("   Records fetched: {}", result.records_fetched);
                    println!("   Rows flattened: {}", result.rows_flattened);
                    println!("   Rows loaded: {}", result.rows_loaded);
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

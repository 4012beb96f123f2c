mod adapters;
mod enrich;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::enrich::run_enrich_bands;
use crate::scrape::{run_catalog, run_scrape, run_sites};

#[derive(Debug, Parser)]
#[command(name = "mrt-cli")]
#[command(about = "Metal release tracker command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the configured retail sites
    Sites,
    /// Crawl one site and store the scraped releases
    Scrape {
        /// Site id from the sites file
        #[arg(long)]
        site: String,

        /// Crawl only these category URLs instead of every configured one
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Print records as JSON lines instead of writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the stored releases of one site, most recently updated first
    Catalog {
        /// Site id from the sites file
        #[arg(long)]
        site: String,

        /// Maximum number of releases to print
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Fill band descriptions, photos and genres from the reference site
    EnrichBands {
        /// Report match and skip counts without fetching or writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Catalog database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check connectivity to the configured databases
    Ping,
    /// Apply pending migrations to the catalog database
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mrt_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Sites) => run_sites(&config)?,
        Some(Commands::Scrape {
            site,
            categories,
            dry_run,
        }) => run_scrape(&config, &site, &categories, dry_run).await?,
        Some(Commands::Catalog { site, limit }) => run_catalog(&config, &site, limit).await?,
        Some(Commands::EnrichBands { dry_run }) => run_enrich_bands(&config, dry_run).await?,
        Some(Commands::Db { command }) => run_db(&config, command).await?,
        None => println!("mrt-cli ready; run with --help to list commands"),
    }

    Ok(())
}

async fn run_db(config: &mrt_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let catalog = mrt_db::connect_catalog(config).await?;

    match command {
        DbCommands::Ping => {
            mrt_db::ping(&catalog).await?;
            println!("catalog database: ok");
            if config.core_database_url.is_some() {
                let core = mrt_db::connect_core(config).await?;
                mrt_db::ping(&core).await?;
                println!("core database: ok");
            }
        }
        DbCommands::Migrate => {
            let applied = mrt_db::run_migrations(&catalog).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}

mod config;
mod error;
mod extract;
mod fetch;
mod links;
mod preprocess;
mod schema;
mod store;

use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;

use config::ScrapeConfig;
use fetch::PageFetcher;
use schema::{schema_for, Position};

#[derive(Parser)]
#[command(
    name = "profiler_scraper",
    about = "playerprofiler.com scrape + preprocess pipeline"
)]
struct Cli {
    /// Scrape config file (YAML)
    #[arg(short, long, default_value = "profile_config")]
    config: String,

    /// Position slug, overriding the config file
    /// (quarterback, running-back, wide-receiver, tight-end)
    #[arg(short, long)]
    position: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and save player profile links for the position
    Links,
    /// Scrape player profiles into a dated raw CSV
    Scrape {
        /// Max players to scrape (default: all discovered)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Normalize the latest raw CSV into model-ready columns
    Preprocess {
        /// Encode categorical columns as integer codes
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        factorize: bool,
    },
    /// Scrape + preprocess in one pipeline
    Run {
        /// Max players to scrape
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Encode categorical columns as integer codes
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        factorize: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Links => {
            let (cfg, position) = load_config(&cli)?;
            let fetcher = PageFetcher::new(&cfg)?;
            let links = links::discover(&fetcher, position, &cfg).await?;
            println!("Saved {} links for {}.", links.len(), position);
        }
        Commands::Scrape { limit } => {
            let (cfg, position) = load_config(&cli)?;
            scrape(&cfg, position, *limit).await?;
        }
        Commands::Preprocess { factorize } => {
            let position = resolve_position(&cli)?;
            preprocess::run(position, *factorize)?;
            println!("Preprocessed {}.", position);
        }
        Commands::Run { limit, factorize } => {
            let (cfg, position) = load_config(&cli)?;
            scrape(&cfg, position, *limit).await?;
            preprocess::run(position, *factorize)?;
            println!("Pipeline finished for {}.", position);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Done in {:.1}s", elapsed.as_secs_f64());
    }

    Ok(())
}

/// Load the YAML config and resolve the position, with the CLI flag taking
/// precedence over the file. Position validation happens before any I/O.
fn load_config(cli: &Cli) -> anyhow::Result<(ScrapeConfig, Position)> {
    let mut cfg = ScrapeConfig::load(&cli.config)?;
    if let Some(position) = &cli.position {
        cfg.position = position.clone();
    }
    let position = cfg.position()?;
    Ok((cfg, position))
}

/// Position for config-less subcommands: the CLI flag when given, the
/// config file otherwise.
fn resolve_position(cli: &Cli) -> anyhow::Result<Position> {
    if let Some(position) = &cli.position {
        return Ok(position.parse()?);
    }
    let cfg = ScrapeConfig::load(&cli.config)?;
    Ok(cfg.position()?)
}

async fn scrape(
    cfg: &ScrapeConfig,
    position: Position,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let fetcher = PageFetcher::new(cfg)?;
    let mut links = links::discover(&fetcher, position, cfg).await?;
    if links.is_empty() {
        println!("No profile links found for {}.", position);
        return Ok(());
    }
    if let Some(n) = limit {
        links.truncate(n);
    }

    info!("scraping {} profiles for {}", links.len(), position);
    let table = extract::scrape_profiles(&fetcher, schema_for(position), &links).await?;
    let path = store::save_raw_table(position, &table)?;
    println!(
        "Scraped {} players for {} into {}.",
        table.rows.len(),
        position,
        path.display()
    );
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use swapi_browser::config;
use swapi_browser::controller::PeopleController;
use swapi_browser::swapi::SwapiClient;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fetch every page of a people query and print the rows as JSON"
)]
struct Args {
    /// Path to YAML config file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search term; lists everyone when omitted
    #[arg(long, default_value = "")]
    query: String,

    /// Stop after this many pages beyond the first
    #[arg(long)]
    max_pages: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    swapi_browser::init_tracing();

    let args = Args::parse();
    let cfg = config::load(args.config.as_deref()).context("failed to load config")?;
    let client = SwapiClient::from_config(&cfg).context("failed to build HTTP client")?;

    let mut controller = PeopleController::new(client);
    controller
        .search(&args.query)
        .await
        .context("failed to fetch the first page")?;
    let pages = controller
        .load_all(args.max_pages)
        .await
        .context("failed to follow the next cursor")?;

    let state = controller.state();
    info!(
        pages = pages + 1,
        fetched = state.fetched_count(),
        total = state.total_count(),
        "dump complete"
    );
    let json = serde_json::to_string_pretty(state.rows()).context("failed to encode rows")?;
    println!("{}", json);
    Ok(())
}

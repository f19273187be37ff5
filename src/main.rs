use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use swapi_browser::command::{Command, HELP};
use swapi_browser::config;
use swapi_browser::controller::{Completion, PeopleController};
use swapi_browser::swapi::{PeopleService, SwapiClient};
use swapi_browser::view;

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse and search Star Wars people page by page")]
struct Args {
    /// Path to YAML config file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with this search instead of the full list
    #[arg(long)]
    query: Option<String>,
}

/// Print whatever rows were appended since `shown`, plus the status line.
fn print_update<S: PeopleService>(controller: &PeopleController<S>, shown: &mut usize) {
    print!("{}", view::render_update(controller.state(), shown));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    swapi_browser::init_tracing();

    let args = Args::parse();
    let cfg = config::load(args.config.as_deref()).context("failed to load config")?;
    let client = SwapiClient::from_config(&cfg).context("failed to build HTTP client")?;
    info!(base_url=%client.base_url(), "starting people browser");

    let mut controller = PeopleController::new(client);
    let mut shown = 0usize;

    let first = match args.query.as_deref() {
        Some(query) => controller.search(query).await,
        None => controller.initialize().await,
    };
    first.context("failed to load the first page")?;
    print_update(&controller, &mut shown);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let result = match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Unknown(input) => {
                println!("unknown command: {} (try `help`)", input);
                continue;
            }
            Command::More => controller.load_more().await.map(|c| c == Completion::Skipped),
            Command::All => controller.load_all(None).await.map(|pages| pages == 0),
            Command::Search(query) => {
                shown = 0;
                controller.search(&query).await.map(|_| false)
            }
        };
        match result {
            Ok(true) => println!("{}", view::status_line(controller.state())),
            Ok(false) => print_update(&controller, &mut shown),
            Err(err) => {
                error!(?err, "request failed");
                println!("request failed: {}", err);
            }
        }
    }

    info!(
        fetched = controller.state().fetched_count(),
        "leaving people browser"
    );
    Ok(())
}

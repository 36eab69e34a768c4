use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use feedscout::config::Config;
use feedscout::FeedFinder;

/// Get the config directory path (~/.config/feedscout/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedscout"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedscout",
    about = "Discover RSS, Atom and OPML feeds advertised by a web page"
)]
struct Args {
    /// Page to scan for feed links
    url: String,

    /// Agent identity for robots.txt and the User-Agent header
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Fetch the page even if robots.txt disallows it
    #[arg(long)]
    ignore_robots: bool,

    /// Only report whether robots.txt allows the page (exit status 1 if not)
    #[arg(long)]
    check_robots: bool,

    /// Print feeds as JSON with their kinds
    #[arg(long)]
    json: bool,

    /// Config file (default: ~/.config/feedscout/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let mut finder = FeedFinder::with_fetcher(args.url.as_str(), config.http_fetcher(client));
    finder
        .set_user_agent(config.user_agent.as_str())
        .set_obey_robots(config.obey_robots && !args.ignore_robots)
        .set_block_private_hosts(config.block_private_hosts);
    if let Some(user_agent) = &args.user_agent {
        finder.set_user_agent(user_agent.as_str());
    }

    if args.check_robots {
        let allowed = finder.robots_allowed().await;
        println!("{}", if allowed { "allowed" } else { "disallowed" });
        if !allowed {
            std::process::exit(1);
        }
        return Ok(());
    }

    let feeds = finder.discover().await;
    tracing::info!(url = %args.url, count = feeds.len(), "Discovery finished");

    if args.json {
        let out = serde_json::to_string_pretty(&feeds).context("Failed to serialize feeds")?;
        println!("{out}");
    } else if feeds.is_empty() {
        eprintln!("No feeds found at {}", args.url);
    } else {
        for feed in &feeds {
            println!("{}", feed.url);
        }
    }

    Ok(())
}

//! Stashline CLI
//!
//! Demonstrates the read-through web cache and the instrumented store
//! against Redis (or an in-process store with `--memory`).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stashline_core::constants::{
    DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_REDIS_URL, DEMO_PREVIEW_CHARS, DEMO_URL, STORE_OPERATION,
};
use stashline_core::traits::KeyValueStore;
use stashline_store::{MemoryStore, RedisStore};
use stashline_tracker::Cache;
use stashline_web::{FetcherConfig, HttpFetcher, WebCache};

/// Stashline - cached page fetching and instrumented key-value storage
#[derive(Parser)]
#[command(name = "stashline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Redis connection URL
    #[arg(long, global = true, env = "REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    redis_url: String,

    /// Use an in-process store instead of Redis
    #[arg(long, global = true)]
    memory: bool,

    /// Page to fetch
    #[arg(long, global = true, default_value = DEMO_URL)]
    url: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "STASHLINE_HTTP_TIMEOUT", default_value_t = DEFAULT_HTTP_TIMEOUT_SECONDS)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page through the cache and show its fetch count (default)
    Fetch,

    /// Store sample values, read them back and replay the call history
    StoreDemo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "stashline=debug,info"
    } else {
        "stashline=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = open_store(&cli).await?;

    match cli.command.unwrap_or(Commands::Fetch) {
        Commands::Fetch => cmd_fetch(store, &cli.url, cli.timeout).await,
        Commands::StoreDemo => cmd_store_demo(store).await,
    }
}

/// Connect to the configured store
async fn open_store(cli: &Cli) -> Result<Arc<dyn KeyValueStore>> {
    if cli.memory {
        info!("Using in-process store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = RedisStore::connect(&cli.redis_url)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", cli.redis_url))?;
    Ok(Arc::new(store))
}

/// Fetch a page through the cache
async fn cmd_fetch(store: Arc<dyn KeyValueStore>, url: &str, timeout: u64) -> Result<()> {
    let fetcher = HttpFetcher::with_config(FetcherConfig::default().with_timeout(timeout))?;
    let cache = WebCache::new(store, Arc::new(fetcher));

    println!("{}", "Fetching page...".cyan().bold());
    let content = cache
        .get_page(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let preview: String = content.chars().take(DEMO_PREVIEW_CHARS).collect();
    println!(
        "{}\n{} ...\n",
        format!("Page content (truncated to {} chars):", DEMO_PREVIEW_CHARS).yellow(),
        preview
    );

    let count = cache.fetch_count(url).await?;
    println!(
        "URL '{}' was fetched {} time(s) from the web (not cache).",
        url,
        count.to_string().green().bold()
    );

    Ok(())
}

/// Exercise the instrumented store
async fn cmd_store_demo(store: Arc<dyn KeyValueStore>) -> Result<()> {
    let cache = Cache::with_reset(store)
        .await
        .context("Failed to reset store")?;

    let foo = cache.store("foo").await?;
    let bar = cache.store("bar").await?;
    let answer = cache.store(42).await?;

    println!("{}", "Stored values:".cyan().bold());
    println!("   {} {:?}", foo.dimmed(), cache.get_str(&foo).await?);
    println!("   {} {:?}", bar.dimmed(), cache.get_str(&bar).await?);
    println!("   {} {:?}", answer.dimmed(), cache.get_int(&answer).await?);

    println!("\n{}", "Replay:".yellow().bold());
    cache.print_replay(STORE_OPERATION).await?;

    Ok(())
}

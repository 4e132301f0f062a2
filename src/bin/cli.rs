//! sitescope CLI
//!
//! Crawls a site, prints page summaries and detected technologies, and
//! manages the on-disk page cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sitescope::{
    analysis::{TechDetector, summarize_page},
    crawl::Crawler,
    error::Result,
    models::{Config, CrawlRequest, CrawlResult, PolicyKind},
    services::HttpFetcher,
    storage::{LocalStorage, PageCache},
    utils::console,
};
use tokio_util::sync::CancellationToken;

/// sitescope - website crawler and analyzer
#[derive(Parser, Debug)]
#[command(name = "sitescope", version, about = "Depth-limited website crawler")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "sitescope.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a website starting at URL
    Crawl {
        url: String,

        /// Maximum link depth from the root page
        #[arg(long)]
        depth: Option<usize>,

        /// Maximum number of pages to record
        #[arg(long)]
        max_pages: Option<usize>,

        /// Concurrent fetches
        #[arg(long)]
        workers: Option<usize>,

        /// Per-fetch timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Domain policy: same-domain, allow-all or allow-list
        #[arg(long)]
        policy: Option<PolicyKind>,

        /// Host for the allow-list policy (repeatable, implies allow-list)
        #[arg(long = "allow")]
        allow: Vec<String>,

        /// Fetch pages even when robots.txt disallows them
        #[arg(long)]
        ignore_robots: bool,

        /// Bypass the page cache
        #[arg(long)]
        no_cache: bool,

        /// Write the full crawl result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Inspect or clear the page cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry count and location
    Stats,
    /// Remove every cached page
    Clear,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    init_logging(cli.verbose, &level);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
        Config::default()
    });

    match cli.command {
        Command::Crawl {
            url,
            depth,
            max_pages,
            workers,
            timeout,
            policy,
            allow,
            ignore_robots,
            no_cache,
            output,
        } => {
            let mut request = config.crawl_request(url);
            if let Some(depth) = depth {
                request = request.with_max_depth(depth);
            }
            if let Some(max_pages) = max_pages {
                request = request.with_max_pages(max_pages);
            }
            if let Some(workers) = workers {
                request = request.with_max_workers(workers);
            }
            if let Some(timeout) = timeout {
                request = request.with_timeout_secs(timeout);
            }
            if policy.is_some() || !allow.is_empty() {
                let kind = policy.unwrap_or(PolicyKind::AllowList);
                let hosts = if allow.is_empty() {
                    config.domain.allow_list.clone()
                } else {
                    allow
                };
                request = request.with_domain_policy(kind.into_policy(&hosts));
            }
            if ignore_robots {
                request = request.with_respect_robots(false);
            }

            run_crawl(&config, request, !no_cache, output.as_deref()).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            console::success(&format!("Config OK ({})", cli.config.display()));
            console::summary(
                "Effective settings",
                &[
                    ("User agent", config.crawler.user_agent.clone()),
                    ("Depth", config.crawler.max_depth.to_string()),
                    ("Max pages", config.crawler.max_pages.to_string()),
                    ("Workers", config.crawler.max_workers.to_string()),
                    ("Timeout", format!("{}s", config.crawler.timeout_secs)),
                    ("Domain policy", config.domain.policy.to_string()),
                    ("Robots.txt", config.crawler.respect_robots.to_string()),
                    ("Cache", cache_description(&config)),
                ],
            );
        }

        Command::Cache { action } => {
            let cache = open_cache(&config);
            match action {
                CacheAction::Stats => {
                    let stats = cache.stats().await?;
                    console::summary(
                        "Page cache",
                        &[
                            ("Location", stats.location),
                            ("Entries", stats.entries.to_string()),
                            ("TTL", format!("{}s", stats.ttl_seconds)),
                        ],
                    );
                }
                CacheAction::Clear => {
                    let removed = cache.clear().await?;
                    console::success(&format!("Removed {} cached page(s)", removed));
                }
            }
        }
    }

    Ok(())
}

fn open_cache(config: &Config) -> PageCache {
    let store = Arc::new(LocalStorage::new(&config.cache.dir));
    PageCache::with_ttl(store, config.cache.ttl_secs)
}

fn cache_description(config: &Config) -> String {
    if config.cache.enabled {
        format!(
            "{} (ttl {}s)",
            config.cache.dir.display(),
            config.cache.ttl_secs
        )
    } else {
        "disabled".to_string()
    }
}

async fn run_crawl(
    config: &Config,
    request: CrawlRequest,
    use_cache: bool,
    output: Option<&Path>,
) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    let mut crawler = Crawler::new(fetcher)
        .with_request_delay(Duration::from_millis(config.crawler.request_delay_ms));
    if use_cache && config.cache.enabled {
        crawler = crawler.with_cache(open_cache(config));
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing in-flight pages...");
            interrupt.cancel();
        }
    });

    let result = crawler.crawl_with_cancellation(request, cancel).await?;
    report(&result)?;

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(path, json).await?;
        console::success(&format!("Result written to {}", path.display()));
    }
    Ok(())
}

fn report(result: &CrawlResult) -> Result<()> {
    console::header(&format!("Crawl of {}", result.request.root_url));

    for page in &result.pages {
        match page.error {
            None => {
                let summary = summarize_page(page);
                let title = summary.title.as_deref().unwrap_or("(untitled)");
                console::sub_item(&format!(
                    "[{}] {} - {} ({} words, {} links)",
                    page.depth,
                    page.url,
                    console::truncate(title, 60),
                    summary.word_count,
                    summary.link_count
                ));
            }
            Some(error) => {
                let status = page
                    .status_code
                    .map(|code| format!(" HTTP {}", code))
                    .unwrap_or_default();
                console::sub_item(&format!(
                    "[{}] {} - {}{}",
                    page.depth, page.url, error, status
                ));
            }
        }
    }

    let usage = TechDetector::builtin()?.detect_across(result);
    if !usage.is_empty() {
        console::separator();
        for tech in &usage {
            console::sub_item(&format!(
                "{} ({}): {} page(s)",
                tech.label, tech.category, tech.pages
            ));
        }
    }

    let stats = &result.stats;
    console::summary(
        "Crawl summary",
        &[
            ("Pages", result.pages.len().to_string()),
            ("Failed", stats.failed_pages.to_string()),
            ("From cache", stats.cache_hits.to_string()),
            ("Live fetches", stats.live_fetches.to_string()),
            ("State", format!("{:?}", result.state)),
            ("Truncated", result.truncated.to_string()),
            ("Cancelled", result.cancelled.to_string()),
            ("Elapsed", format!("{} ms", stats.elapsed_ms())),
        ],
    );
    Ok(())
}

mod categories;
mod config;
mod db;
mod error;
mod export;
mod models;
mod normalize;
mod pipeline;
mod scrapers;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Backend, Config, DEFAULT_CONFIG_PATH};
use db::Repository;
use export::CsvMirror;
use models::Category;
use pipeline::{AppCrawler, CrawlReport, ReviewCrawler};
use scrapers::{ChromePageLoader, DetailSource, HttpPageLoader, ListingSource, ListingWalker, PageLoader, ReviewSource, Storefront};

#[derive(Parser)]
#[command(name = "playstore-scout")]
#[command(about = "Crawl Play Store categories into SQLite")]
struct Cli {
    /// Configuration file path
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Scrape app detail pages into the apps table (default)
    Apps,
    /// Scrape reviews of apps already stored
    Reviews,
    /// Write the built-in category list to the categories CSV
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Apps);
    let config = Config::load(&cli.config).with_context(|| format!("Failed to load {}", cli.config.display()))?;

    info!("📱 Play Store Scout");
    info!("==========================================");

    if command == Command::Categories {
        let categories = categories::builtin_categories();
        categories::write_categories(&config.categories_csv, &categories)?;
        info!("💾 Saved {} categories to {}", categories.len(), config.categories_csv.display());
        return Ok(());
    }

    let categories = categories::load_categories(&config.categories_csv);
    if categories.is_empty() {
        info!(
            "No categories in {}; run `playstore-scout categories` to write the built-in list",
            config.categories_csv.display()
        );
        return Ok(());
    }

    let repo = Repository::open(&config.database)
        .await
        .with_context(|| format!("Failed to open {}", config.database.display()))?;

    match config.backend {
        Backend::Browser => {
            let loader = ChromePageLoader::new(&config.browser)?;
            run(command, &config, loader, &repo, &categories).await
        }
        Backend::Http => {
            let loader = HttpPageLoader::new(&config.http)?;
            run(command, &config, loader, &repo, &categories).await
        }
    }
}

async fn run<L: PageLoader>(
    command: Command,
    config: &Config,
    loader: L,
    repo: &Repository,
    categories: &[Category],
) -> anyhow::Result<()> {
    let storefront = Storefront::new(loader, config.browser.click_attempts);
    let mirror = CsvMirror::new(config.apps_csv.clone(), config.reviews_csv.clone());
    let walker = ListingWalker::new(config.links_per_listing, config.ranking_tabs);

    info!("Crawling {} categories, up to {} apps each", categories.len(), config.category_limit);

    match command {
        Command::Apps => crawl_apps(&storefront, config, repo, &mirror, walker, categories).await,
        Command::Reviews => crawl_reviews(&storefront, config, repo, &mirror, walker, categories).await,
        Command::Categories => Ok(()),
    }
}

async fn crawl_apps<S: ListingSource + DetailSource>(
    source: &S,
    config: &Config,
    repo: &Repository,
    mirror: &CsvMirror,
    walker: ListingWalker,
    categories: &[Category],
) -> anyhow::Result<()> {
    let crawler = AppCrawler::new(source, repo, mirror, walker, config.category_limit, config.on_duplicate);
    let (report, apps) = crawler.run(categories).await;

    if let Some(path) = &config.json_snapshot {
        export::write_json_snapshot(path, &apps).await?;
    }

    log_report(&report);
    info!("💾 {} apps stored in {}", repo.count_apps().await?, config.database.display());
    Ok(())
}

async fn crawl_reviews<S: ListingSource + ReviewSource>(
    source: &S,
    config: &Config,
    repo: &Repository,
    mirror: &CsvMirror,
    walker: ListingWalker,
    categories: &[Category],
) -> anyhow::Result<()> {
    let crawler = ReviewCrawler::new(source, repo, mirror, walker, config.category_limit);
    let report = crawler.run(categories).await;

    log_report(&report);
    info!("💾 {} new reviews stored in {}", report.reviews_stored, config.database.display());
    Ok(())
}

fn log_report(report: &CrawlReport) {
    info!("");
    info!("✅ Done: {} categories, {} pages visited", report.categories, report.pages_visited);
    info!(
        "   {} inserted, {} updated, {} duplicates, {} skipped, {} failed",
        report.inserted, report.updated, report.duplicates, report.skipped, report.failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_apps() {
        let cli = Cli::try_parse_from(["playstore-scout"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.command.unwrap_or(Command::Apps), Command::Apps);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_command_and_config_path() {
        let cli = Cli::try_parse_from(["playstore-scout", "reviews", "--config", "custom.toml"]).unwrap();
        assert_eq!(cli.command, Some(Command::Reviews));
        assert_eq!(cli.config, PathBuf::from("custom.toml"));

        let cli = Cli::try_parse_from(["playstore-scout", "--config", "other.toml", "categories"]).unwrap();
        assert_eq!(cli.command, Some(Command::Categories));
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["playstore-scout", "--config"]).is_err());
        assert!(Cli::try_parse_from(["playstore-scout", "scrape"]).is_err());
    }
}

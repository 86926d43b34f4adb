use tracing::{debug, error, info, warn};

use crate::config::DuplicatePolicy;
use crate::db::{InsertOutcome, Repository};
use crate::error::AppError;
use crate::export::CsvMirror;
use crate::models::{AppRecord, Category};
use crate::normalize::{normalize_app, normalize_reviews};
use crate::scrapers::{CategoryCounter, DetailSource, ListingLink, ListingSource, ListingWalker, ReviewSource};

/// Tallies for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub categories: usize,
    pub pages_visited: usize,
    pub inserted: usize,
    pub updated: usize,
    pub duplicates: usize,
    pub reviews_stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

fn log_item_error(url: &str, err: &AppError) {
    if err.is_item_level() {
        warn!("Skipping {}: {}", url, err);
    } else {
        error!("Failed on {}: {}", url, err);
    }
}

/// Category listings → detail pages → `apps` rows
pub struct AppCrawler<'a, S> {
    source: &'a S,
    repo: &'a Repository,
    mirror: &'a CsvMirror,
    walker: ListingWalker,
    category_limit: usize,
    policy: DuplicatePolicy,
}

impl<'a, S: ListingSource + DetailSource> AppCrawler<'a, S> {
    pub fn new(
        source: &'a S,
        repo: &'a Repository,
        mirror: &'a CsvMirror,
        walker: ListingWalker,
        category_limit: usize,
        policy: DuplicatePolicy,
    ) -> Self {
        Self {
            source,
            repo,
            mirror,
            walker,
            category_limit,
            policy,
        }
    }

    /// Visit every category in order; returns the tallies and the rows written
    pub async fn run(&self, categories: &[Category]) -> (CrawlReport, Vec<AppRecord>) {
        let mut report = CrawlReport::default();
        let mut counter = CategoryCounter::new(self.category_limit);
        let mut scraped = Vec::new();

        for category in categories {
            info!("📂 Category {} ({})", category.name, category.url);
            report.categories += 1;

            let links = self.walker.walk(self.source, category, &mut counter).await;
            for link in links {
                report.pages_visited += 1;
                if let Some(app) = self.process_app(category, &link, &mut report).await {
                    scraped.push(app);
                }
            }
        }

        (report, scraped)
    }

    async fn process_app(
        &self,
        category: &Category,
        link: &ListingLink,
        report: &mut CrawlReport,
    ) -> Option<AppRecord> {
        let raw = match self.source.fetch_detail_fields(&link.url).await {
            Ok(raw) => raw,
            Err(e) => {
                log_item_error(&link.url, &e);
                report.failed += 1;
                return None;
            }
        };

        let ranking = link.ranking.map(|tab| tab.label());
        let Some(app) = normalize_app(&category.name, ranking, &link.url, &raw) else {
            warn!("No title on {}, skipping app", link.url);
            report.skipped += 1;
            return None;
        };

        let outcome = match self.repo.insert_app(app.clone(), self.policy).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log_item_error(&link.url, &e);
                report.failed += 1;
                return None;
            }
        };

        let app_id = outcome.app_id();
        match outcome {
            InsertOutcome::Inserted(_) => {
                info!("✅ {} (app {})", app.title, app_id);
                report.inserted += 1;
            }
            InsertOutcome::Updated(_) => {
                info!("Updated {} (app {})", app.title, app_id);
                report.updated += 1;
            }
            InsertOutcome::Ignored(_) => {
                debug!("{} already stored as app {}, ignored", app.title, app_id);
                report.duplicates += 1;
                return None;
            }
        }

        if let Err(e) = self.mirror.append_app(&app) {
            warn!("Could not mirror {} to CSV: {}", app.title, e);
        }
        Some(app)
    }
}

/// Category listings → detail pages of stored apps → `reviews` rows
pub struct ReviewCrawler<'a, S> {
    source: &'a S,
    repo: &'a Repository,
    mirror: &'a CsvMirror,
    walker: ListingWalker,
    category_limit: usize,
}

impl<'a, S: ListingSource + ReviewSource> ReviewCrawler<'a, S> {
    pub fn new(
        source: &'a S,
        repo: &'a Repository,
        mirror: &'a CsvMirror,
        walker: ListingWalker,
        category_limit: usize,
    ) -> Self {
        Self {
            source,
            repo,
            mirror,
            walker,
            category_limit,
        }
    }

    pub async fn run(&self, categories: &[Category]) -> CrawlReport {
        let mut report = CrawlReport::default();
        let mut counter = CategoryCounter::new(self.category_limit);

        for category in categories {
            info!("📂 Reviews for {} ({})", category.name, category.url);
            report.categories += 1;

            let links = self.walker.walk(self.source, category, &mut counter).await;
            for link in links {
                report.pages_visited += 1;
                self.process_reviews(&link, &mut report).await;
            }
        }

        report
    }

    async fn process_reviews(&self, link: &ListingLink, report: &mut CrawlReport) {
        let page = match self.source.fetch_reviews(&link.url).await {
            Ok(page) => page,
            Err(e) => {
                log_item_error(&link.url, &e);
                report.failed += 1;
                return;
            }
        };

        let Some(title) = page.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            info!("No title on {}, skipping reviews", link.url);
            report.skipped += 1;
            return;
        };

        let app_id = match self.repo.app_id_by_title(title).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                info!("Skipping reviews for {}, not in the apps table", title);
                report.skipped += 1;
                return;
            }
            Err(e) => {
                log_item_error(&link.url, &e);
                report.failed += 1;
                return;
            }
        };

        let reviews = normalize_reviews(&page.reviews);
        if reviews.is_empty() {
            debug!("No reviews with text for {}", title);
            return;
        }

        match self.repo.insert_reviews(app_id, reviews).await {
            Ok(inserted) => {
                let total = self.repo.count_reviews(app_id).await.unwrap_or_default();
                info!("✅ {} new reviews for {} ({} stored)", inserted.len(), title, total);
                report.reviews_stored += inserted.len();
                if inserted.is_empty() {
                    return;
                }
                if let Err(e) = self.mirror.append_reviews(title, &inserted) {
                    warn!("Could not mirror reviews of {} to CSV: {}", title, e);
                }
            }
            Err(e) => {
                log_item_error(&link.url, &e);
                report.failed += 1;
            }
        }
    }
}

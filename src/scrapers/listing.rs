use std::collections::{HashMap, HashSet};

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{Category, RankingTab};
use crate::scrapers::selectors::{DETAIL_PATH, LISTING};
use crate::scrapers::traits::ListingSource;

/// Absolute detail-page links on a listing page, in page order, without
/// duplicates, at most `limit` of them.
pub fn parse_listing_links(html: &str, base_url: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    for selector in LISTING.iter() {
        let mut seen = HashSet::new();
        let links: Vec<String> = document
            .select(selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve(base.as_ref(), href))
            .filter(|url| url.contains(DETAIL_PATH))
            .filter(|url| seen.insert(url.clone()))
            .take(limit)
            .collect();

        if !links.is_empty() {
            return links;
        }
    }

    Vec::new()
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

/// Detail pages taken so far, per category, capped at `limit`
#[derive(Debug)]
pub struct CategoryCounter {
    limit: usize,
    counts: HashMap<String, usize>,
}

impl CategoryCounter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }

    /// Count one more page for `category`; false once the cap is reached
    pub fn try_take(&mut self, category: &str) -> bool {
        let count = self.counts.entry(category.to_string()).or_insert(0);
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }

    pub fn has_capacity(&self, category: &str) -> bool {
        self.count(category) < self.limit
    }

    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }
}

/// A detail page reached from a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    pub url: String,
    pub ranking: Option<RankingTab>,
}

/// Walks one category: either the plain listing or each ranking tab in turn
pub struct ListingWalker {
    links_per_listing: usize,
    tabs: Vec<Option<RankingTab>>,
}

impl ListingWalker {
    pub fn new(links_per_listing: usize, ranking_tabs: bool) -> Self {
        let tabs = if ranking_tabs {
            RankingTab::ALL.iter().copied().map(Some).collect()
        } else {
            vec![None]
        };
        Self { links_per_listing, tabs }
    }

    /// Collect the category's detail links, taking each one from `counter`.
    /// A listing that fails to load is logged and skipped.
    pub async fn walk<S: ListingSource + ?Sized>(
        &self,
        source: &S,
        category: &Category,
        counter: &mut CategoryCounter,
    ) -> Vec<ListingLink> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for tab in &self.tabs {
            if !counter.has_capacity(&category.name) {
                debug!("Category {} reached its limit", category.name);
                break;
            }

            let label = tab.map(|t| t.label()).unwrap_or("listing");
            let urls = match source
                .fetch_listing_links(&category.url, *tab, self.links_per_listing)
                .await
            {
                Ok(urls) => urls,
                Err(e) => {
                    warn!("Skipping {} {}: {}", category.name, label, e);
                    continue;
                }
            };

            if urls.is_empty() {
                warn!("No app links found for {} {}", category.name, label);
            }

            for url in urls {
                if !seen.insert(url.clone()) {
                    continue;
                }
                if !counter.try_take(&category.name) {
                    break;
                }
                links.push(ListingLink { url, ranking: *tab });
            }
        }

        info!("{}: {} detail pages to visit", category.name, links.len());
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use async_trait::async_trait;

    const LISTING_HTML: &str = r#"
        <html><body>
          <div class="zuJxTd">
            <a href="/store/apps/details?id=com.alpha">Alpha</a>
            <a href="/store/apps/details?id=com.beta">Beta</a>
            <a href="/store/apps/details?id=com.alpha">Alpha again</a>
            <a href="/store/apps/category/TOOLS">Not an app</a>
            <a href="https://play.google.com/store/apps/details?id=com.gamma">Gamma</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_links_resolves_and_dedupes() {
        let links = parse_listing_links(
            LISTING_HTML,
            "https://play.google.com/store/apps/category/ART_AND_DESIGN?hl=en",
            10,
        );
        assert_eq!(
            links,
            vec![
                "https://play.google.com/store/apps/details?id=com.alpha",
                "https://play.google.com/store/apps/details?id=com.beta",
                "https://play.google.com/store/apps/details?id=com.gamma",
            ]
        );
    }

    #[test]
    fn test_parse_listing_links_respects_limit() {
        let links = parse_listing_links(LISTING_HTML, "https://play.google.com/", 2);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_parse_listing_links_prefers_ranking_grid() {
        let html = r#"
            <section jscontroller="xIgeFAf">
              <div class="ULeU3b neq64b"><a href="/store/apps/details?id=com.top">Top</a></div>
            </section>
            <div class="zuJxTd"><a href="/store/apps/details?id=com.other">Other</a></div>
        "#;
        let links = parse_listing_links(html, "https://play.google.com/", 5);
        assert_eq!(links, vec!["https://play.google.com/store/apps/details?id=com.top"]);
    }

    #[test]
    fn test_parse_listing_links_empty_page() {
        assert!(parse_listing_links("<html></html>", "https://play.google.com/", 5).is_empty());
    }

    #[test]
    fn test_category_counter_caps_per_category() {
        let mut counter = CategoryCounter::new(2);
        assert!(counter.try_take("TOOLS"));
        assert!(counter.try_take("TOOLS"));
        assert!(!counter.try_take("TOOLS"));
        assert!(!counter.has_capacity("TOOLS"));
        assert!(counter.try_take("COMICS"));
        assert_eq!(counter.count("TOOLS"), 2);
        assert_eq!(counter.count("COMICS"), 1);
    }

    struct TabbedSource;

    #[async_trait]
    impl ListingSource for TabbedSource {
        async fn fetch_listing_links(
            &self,
            _category_url: &str,
            tab: Option<RankingTab>,
            limit: usize,
        ) -> Result<Vec<String>> {
            let urls = match tab {
                Some(RankingTab::TopFree) => vec!["a", "b"],
                Some(RankingTab::TopGrossing) => vec!["b", "c"],
                Some(RankingTab::TopPaid) => return Err(AppError::ElementNotFound("tab".into())),
                None => vec!["x"],
            };
            Ok(urls.into_iter().take(limit).map(String::from).collect())
        }
    }

    #[tokio::test]
    async fn test_walker_tags_tabs_and_skips_failed_tab() {
        let walker = ListingWalker::new(5, true);
        let category = Category::new("TOOLS", "https://play.google.com/store/apps/category/TOOLS");
        let mut counter = CategoryCounter::new(10);

        let links = walker.walk(&TabbedSource, &category, &mut counter).await;

        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert_eq!(links[2].ranking, Some(RankingTab::TopGrossing));
        assert_eq!(counter.count("TOOLS"), 3);
    }

    #[tokio::test]
    async fn test_walker_stops_at_category_limit() {
        let walker = ListingWalker::new(5, true);
        let category = Category::new("TOOLS", "u");
        let mut counter = CategoryCounter::new(1);

        let links = walker.walk(&TabbedSource, &category, &mut counter).await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].ranking, Some(RankingTab::TopFree));
    }

    #[tokio::test]
    async fn test_walker_plain_listing() {
        let walker = ListingWalker::new(5, false);
        let category = Category::new("TOOLS", "u");
        let mut counter = CategoryCounter::new(10);

        let links = walker.walk(&TabbedSource, &category, &mut counter).await;
        assert_eq!(links, vec![ListingLink { url: "x".into(), ranking: None }]);
    }
}

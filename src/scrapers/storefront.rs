use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{RankingTab, RawAppFields, ReviewPage};
use crate::scrapers::detail::{parse_detail_fields, parse_review_page};
use crate::scrapers::listing::parse_listing_links;
use crate::scrapers::selectors::{by_id, EXPAND_BUTTON, SEE_ALL_REVIEWS_BUTTON, SEE_ALL_REVIEWS_TEXT};
use crate::scrapers::traits::{DetailSource, ListingSource, PageLoader, ReviewSource};
use crate::scrapers::types::{Interaction, PageRequest};

/// Play Store pages read through any [`PageLoader`]
pub struct Storefront<L> {
    loader: L,
    click_attempts: u32,
}

impl<L: PageLoader> Storefront<L> {
    pub fn new(loader: L, click_attempts: u32) -> Self {
        info!("Reading storefront pages via {}", loader.backend_name());
        Self { loader, click_attempts }
    }
}

#[async_trait]
impl<L: PageLoader> ListingSource for Storefront<L> {
    async fn fetch_listing_links(
        &self,
        category_url: &str,
        tab: Option<RankingTab>,
        limit: usize,
    ) -> Result<Vec<String>> {
        let mut request = PageRequest::new(category_url);
        if let Some(tab) = tab {
            request = request.then(Interaction::required(by_id(tab.element_id()), self.click_attempts));
        }

        let html = self.loader.load(&request).await?;
        let links = parse_listing_links(&html, category_url, limit);
        debug!("{} links on {} ({:?})", links.len(), category_url, tab);
        Ok(links)
    }
}

#[async_trait]
impl<L: PageLoader> DetailSource for Storefront<L> {
    async fn fetch_detail_fields(&self, url: &str) -> Result<RawAppFields> {
        let request = PageRequest::new(url).then(Interaction::optional(EXPAND_BUTTON));
        let html = self.loader.load(&request).await?;
        Ok(parse_detail_fields(&html))
    }
}

#[async_trait]
impl<L: PageLoader> ReviewSource for Storefront<L> {
    async fn fetch_reviews(&self, url: &str) -> Result<ReviewPage> {
        let request = PageRequest::new(url)
            .then(Interaction::optional(SEE_ALL_REVIEWS_BUTTON).with_text(SEE_ALL_REVIEWS_TEXT));
        let html = self.loader.load(&request).await?;
        Ok(parse_review_page(&html))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeLoader;
    use super::*;

    const CATEGORY: &str = "https://play.google.com/store/apps/category/TOOLS";

    #[tokio::test]
    async fn test_listing_with_tab_clicks_the_tab() {
        let loader = FakeLoader::default().with_page(
            CATEGORY,
            r#"<div class="zuJxTd"><a href="/store/apps/details?id=com.one">One</a></div>"#,
        );
        let storefront = Storefront::new(loader, 3);

        let links = storefront
            .fetch_listing_links(CATEGORY, Some(RankingTab::TopPaid), 5)
            .await
            .unwrap();
        assert_eq!(links, vec!["https://play.google.com/store/apps/details?id=com.one"]);

        let requests = storefront.loader.requests.lock().unwrap();
        let click = &requests[0].interactions[0];
        assert_eq!(click.selector, "[id=\"ct|apps_topselling_paid\"]");
        assert!(click.required);
        assert_eq!(click.attempts, 3);
    }

    #[tokio::test]
    async fn test_detail_requests_optional_expand() {
        let url = "https://play.google.com/store/apps/details?id=com.one";
        let loader = FakeLoader::default().with_page(url, "<h1><span>One</span></h1>");
        let storefront = Storefront::new(loader, 3);

        let fields = storefront.fetch_detail_fields(url).await.unwrap();
        assert_eq!(fields.title.as_deref(), Some("One"));

        let requests = storefront.loader.requests.lock().unwrap();
        assert_eq!(requests[0].interactions, vec![Interaction::optional(EXPAND_BUTTON)]);
    }

    #[tokio::test]
    async fn test_reviews_click_see_all_by_text() {
        let url = "https://play.google.com/store/apps/details?id=com.one";
        let loader = FakeLoader::default().with_page(url, "<h1><span>One</span></h1>");
        let storefront = Storefront::new(loader, 3);

        let page = storefront.fetch_reviews(url).await.unwrap();
        assert_eq!(page.title.as_deref(), Some("One"));
        assert!(page.reviews.is_empty());

        let requests = storefront.loader.requests.lock().unwrap();
        assert_eq!(
            requests[0].interactions[0].text_contains.as_deref(),
            Some(SEE_ALL_REVIEWS_TEXT)
        );
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let storefront = Storefront::new(FakeLoader::default(), 3);
        let err = storefront.fetch_detail_fields("https://nowhere.test").await.unwrap_err();
        assert!(err.is_item_level());
    }
}

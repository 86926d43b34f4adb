use crate::error::Result;
use crate::models::{RankingTab, RawAppFields, ReviewPage};
use crate::scrapers::types::PageRequest;
use async_trait::async_trait;

/// Loads a page and returns its HTML after running the requested clicks.
/// Implemented by the headless Chrome session and the plain HTTP client.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, request: &PageRequest) -> Result<String>;

    fn backend_name(&self) -> &'static str;
}

/// Finds detail-page links on a category listing
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listing_links(
        &self,
        category_url: &str,
        tab: Option<RankingTab>,
        limit: usize,
    ) -> Result<Vec<String>>;
}

/// Reads the raw app fields of a detail page
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_detail_fields(&self, url: &str) -> Result<RawAppFields>;
}

/// Reads the title and visible reviews of a detail page
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_reviews(&self, url: &str) -> Result<ReviewPage>;
}

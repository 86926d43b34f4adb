use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::normalize::NOT_AVAILABLE;

/// A storefront category and the listing page that enumerates it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "Category")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl Category {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Ranking toggles shown on a category page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingTab {
    TopFree,
    TopGrossing,
    TopPaid,
}

impl RankingTab {
    pub const ALL: [RankingTab; 3] = [RankingTab::TopFree, RankingTab::TopGrossing, RankingTab::TopPaid];

    pub fn label(&self) -> &'static str {
        match self {
            RankingTab::TopFree => "Top Free",
            RankingTab::TopGrossing => "Top Grossing",
            RankingTab::TopPaid => "Top Paid",
        }
    }

    /// DOM id of the tab's toggle button
    pub fn element_id(&self) -> &'static str {
        match self {
            RankingTab::TopFree => "ct|apps_topselling_free",
            RankingTab::TopGrossing => "ct|apps_topgrossing",
            RankingTab::TopPaid => "ct|apps_topselling_paid",
        }
    }
}

impl fmt::Display for RankingTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field values as read from a detail page, before normalization.
/// `None` means the element was not on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAppFields {
    pub title: Option<String>,
    pub rating: Option<String>,
    pub version: Option<String>,
    pub review_count: Option<String>,
    pub downloads: Option<String>,
    pub requires_android: Option<String>,
    pub age_suitability: Option<String>,
    pub updated_on: Option<String>,
    pub ads: Option<String>,
    pub in_app_purchases: Option<String>,
    pub price: Option<String>,
}

/// A count such as downloads or reviews; unparseable input is `NotAvailable`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Exact(u64),
    NotAvailable,
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Exact(n) => write!(f, "{}", n),
            Count::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Count::Exact(n) => serializer.serialize_u64(*n),
            Count::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Normalized app row, ready for the `apps` table
#[derive(Debug, Clone, Serialize)]
pub struct AppRecord {
    pub category: String,
    pub title: String,
    pub rating: String,
    pub version: String,
    pub review_count: Count,
    pub downloads: Count,
    pub age_suitability: String,
    pub updated_on: String,
    pub ads: String,
    pub requires_android: String,
    pub in_app_purchases: String,
    pub price: String,
    pub ranking_category: Option<String>,
    pub url: String,
    pub scraped_at: DateTime<Utc>,
}

/// One review block as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReview {
    pub reviewer_name: Option<String>,
    pub review_text: Option<String>,
    pub review_date: Option<String>,
    pub rating: Option<String>,
}

/// What a detail page yields for the review flow
#[derive(Debug, Clone, Default)]
pub struct ReviewPage {
    pub title: Option<String>,
    pub reviews: Vec<RawReview>,
}

/// Normalized review row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub reviewer_name: String,
    pub review_text: String,
    pub review_date: String,
    pub rating: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_display_uses_sentinel() {
        assert_eq!(Count::Exact(1200).to_string(), "1200");
        assert_eq!(Count::NotAvailable.to_string(), "Not Available");
    }

    #[test]
    fn test_count_serializes_as_number_or_string() {
        assert_eq!(serde_json::to_string(&Count::Exact(42)).unwrap(), "42");
        assert_eq!(
            serde_json::to_string(&Count::NotAvailable).unwrap(),
            "\"Not Available\""
        );
    }

    #[test]
    fn test_ranking_tab_ids() {
        assert_eq!(RankingTab::TopPaid.element_id(), "ct|apps_topselling_paid");
        assert_eq!(RankingTab::TopGrossing.to_string(), "Top Grossing");
    }
}

//! Turns scraped strings into typed values.
//!
//! Every function here is total: input that cannot be understood becomes a
//! sentinel, and feeding a normalized value (sentinels included) back in
//! returns it unchanged.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::models::{AppRecord, Count, RawAppFields, RawReview, Review};

pub const NOT_AVAILABLE: &str = "Not Available";
pub const NO_RATING: &str = "No Rating";
pub const NO_AD: &str = "No Ad";
pub const NO_IN_APP_PURCHASES: &str = "No in-app-purchases";
pub const FREE: &str = "Free";
pub const ANONYMOUS: &str = "Anonymous";
pub const UNKNOWN_DATE: &str = "Unknown";

const STORE_DATE_FORMATS: [&str; 2] = ["%b %d, %Y", "%B %d, %Y"];
const NORMALIZED_DATE_FORMAT: &str = "%Y/%m/%d";

/// Build an app row from raw detail-page fields.
///
/// Returns `None` only when the title is missing, which rejects the whole record.
pub fn normalize_app(
    category: &str,
    ranking_category: Option<&str>,
    url: &str,
    raw: &RawAppFields,
) -> Option<AppRecord> {
    let title = present(raw.title.as_deref())?.to_string();

    Some(AppRecord {
        category: category.to_string(),
        title,
        rating: clean_rating(raw.rating.as_deref()),
        version: or_sentinel(raw.version.as_deref(), NOT_AVAILABLE),
        review_count: raw.review_count.as_deref().map_or(Count::NotAvailable, parse_count),
        downloads: raw.downloads.as_deref().map_or(Count::NotAvailable, parse_count),
        age_suitability: clean_age(raw.age_suitability.as_deref()),
        updated_on: raw.updated_on.as_deref().map_or_else(|| NOT_AVAILABLE.to_string(), format_updated_on),
        ads: or_sentinel(raw.ads.as_deref(), NO_AD),
        requires_android: or_sentinel(raw.requires_android.as_deref(), NOT_AVAILABLE),
        in_app_purchases: or_sentinel(raw.in_app_purchases.as_deref(), NO_IN_APP_PURCHASES),
        price: or_sentinel(raw.price.as_deref(), FREE),
        ranking_category: ranking_category.map(str::to_string),
        url: url.to_string(),
        scraped_at: Utc::now(),
    })
}

/// Drop reviews without text and fill the remaining gaps with sentinels
pub fn normalize_reviews(raw: &[RawReview]) -> Vec<Review> {
    raw.iter()
        .filter_map(|review| {
            let text = present(review.review_text.as_deref())?;
            Some(Review {
                reviewer_name: or_sentinel(review.reviewer_name.as_deref(), ANONYMOUS),
                review_text: text.to_string(),
                review_date: or_sentinel(review.review_date.as_deref(), UNKNOWN_DATE),
                rating: clean_rating(review.rating.as_deref()),
            })
        })
        .collect()
}

/// "4.5\nstar" -> "4.5"
pub fn clean_rating(raw: Option<&str>) -> String {
    let cleaned = raw.map(|r| r.replace("star", "")).unwrap_or_default();
    match cleaned.trim() {
        "" => NO_RATING.to_string(),
        rating => rating.to_string(),
    }
}

/// Parse counts such as "1.2K+", "10M+", "5L", "1Cr" or "1,000,000+".
pub fn parse_count(raw: &str) -> Count {
    let number: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if number.is_empty() {
        debug!("No digits in count {:?}", raw);
        return Count::NotAvailable;
    }

    match magnitude(raw) {
        Some(factor) => match number.parse::<f64>() {
            Ok(value) => scaled(value, factor),
            Err(_) => Count::NotAvailable,
        },
        None => number.parse::<u64>().map_or(Count::NotAvailable, Count::Exact),
    }
}

fn scaled(value: f64, factor: u64) -> Count {
    let scaled = (value * factor as f64).round();
    // u64::MAX as f64 rounds up to 2^64, which is already out of range
    if !scaled.is_finite() || scaled < 0.0 || scaled >= u64::MAX as f64 {
        debug!("Count {} x {} out of range", value, factor);
        return Count::NotAvailable;
    }
    Count::Exact(scaled as u64)
}

/// Multiplier named by the first unit after the last digit, if any
fn magnitude(raw: &str) -> Option<u64> {
    let last_digit = raw.rfind(|c: char| c.is_ascii_digit())?;
    let suffix = raw[last_digit + 1..].trim_start_matches(|c: char| c == '.' || c.is_whitespace());

    if suffix.starts_with("Cr") {
        Some(10_000_000)
    } else if suffix.starts_with('K') {
        Some(1_000)
    } else if suffix.starts_with('M') {
        Some(1_000_000)
    } else if suffix.starts_with('L') {
        Some(100_000)
    } else {
        None
    }
}

/// "Rated for 12+" -> "12+"
pub fn clean_age(raw: Option<&str>) -> String {
    let cleaned: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if cleaned.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        cleaned
    }
}

/// "Mar 4, 2025" -> "2025/03/04"
///
/// Dates already in `YYYY/MM/DD` form are returned as they are; anything
/// else becomes "Not Available".
pub fn format_updated_on(raw: &str) -> String {
    let trimmed = raw.trim();

    if NaiveDate::parse_from_str(trimmed, NORMALIZED_DATE_FORMAT).is_ok() {
        return trimmed.to_string();
    }

    STORE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format(NORMALIZED_DATE_FORMAT).to_string())
        .unwrap_or_else(|| {
            debug!("Unrecognised update date {:?}", raw);
            NOT_AVAILABLE.to_string()
        })
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn or_sentinel(raw: Option<&str>, sentinel: &str) -> String {
    present(raw).unwrap_or(sentinel).to_string()
}

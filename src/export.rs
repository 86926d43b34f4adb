use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::models::{AppRecord, Review};

/// Review row as it appears in the flat mirror, which has no app ids
#[derive(Debug, Serialize)]
struct ReviewRow<'a> {
    app_title: &'a str,
    reviewer_name: &'a str,
    review_text: &'a str,
    review_date: &'a str,
    rating: &'a str,
}

impl<'a> ReviewRow<'a> {
    fn new(app_title: &'a str, review: &'a Review) -> Self {
        Self {
            app_title,
            reviewer_name: &review.reviewer_name,
            review_text: &review.review_text,
            review_date: &review.review_date,
            rating: &review.rating,
        }
    }
}

/// Append-only CSV copies of the rows written to the database
#[derive(Debug, Default, Clone)]
pub struct CsvMirror {
    apps: Option<PathBuf>,
    reviews: Option<PathBuf>,
}

impl CsvMirror {
    pub fn new(apps: Option<PathBuf>, reviews: Option<PathBuf>) -> Self {
        Self { apps, reviews }
    }

    pub fn append_app(&self, app: &AppRecord) -> Result<()> {
        match &self.apps {
            Some(path) => append_rows(path, std::iter::once(app)),
            None => Ok(()),
        }
    }

    pub fn append_reviews(&self, app_title: &str, reviews: &[Review]) -> Result<()> {
        match &self.reviews {
            Some(path) => append_rows(path, reviews.iter().map(|review| ReviewRow::new(app_title, review))),
            None => Ok(()),
        }
    }
}

/// Append rows, writing the header only when the file is new or empty
fn append_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every app scraped in this run as pretty JSON
pub async fn write_json_snapshot(path: &Path, apps: &[AppRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(apps)?;
    tokio::fs::write(path, json).await?;
    info!("💾 Saved {} apps to {}", apps.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAppFields;
    use crate::normalize::normalize_app;

    fn app(title: &str) -> AppRecord {
        let raw = RawAppFields {
            title: Some(title.to_string()),
            review_count: Some("1.2K".to_string()),
            ..Default::default()
        };
        normalize_app("ART", Some("Top Free"), "https://example.test/app", &raw).unwrap()
    }

    #[test]
    fn test_apps_mirror_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.csv");
        let mirror = CsvMirror::new(Some(path.clone()), None);

        mirror.append_app(&app("One")).unwrap();
        mirror.append_app(&app("Two")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("category,title,rating,version,review_count,downloads"));
        assert!(lines[1].starts_with("ART,One,No Rating,Not Available,1200,Not Available"));
        assert!(lines[2].starts_with("ART,Two,"));
    }

    #[test]
    fn test_reviews_mirror_carries_app_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reviews.csv");
        let mirror = CsvMirror::new(None, Some(path.clone()));

        let reviews = vec![Review {
            reviewer_name: "Ana".to_string(),
            review_text: "Great, really".to_string(),
            review_date: "Unknown".to_string(),
            rating: "5".to_string(),
        }];
        mirror.append_reviews("Sketchbook", &reviews).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "app_title,reviewer_name,review_text,review_date,rating\nSketchbook,Ana,\"Great, really\",Unknown,5\n"
        );
    }

    #[test]
    fn test_disabled_mirror_is_a_no_op() {
        let mirror = CsvMirror::default();
        mirror.append_app(&app("One")).unwrap();
        mirror.append_reviews("One", &[]).unwrap();
    }

    #[tokio::test]
    async fn test_json_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");

        write_json_snapshot(&path, &[app("One")]).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["title"], "One");
        assert_eq!(value[0]["review_count"], 1200);
        assert_eq!(value[0]["downloads"], "Not Available");
    }
}

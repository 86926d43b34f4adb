use std::path::Path;

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::config::DuplicatePolicy;
use crate::error::Result;
use crate::models::{AppRecord, Review};

use super::schema::SCHEMA;

/// What `insert_app` did with a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    Updated(i64),
    /// Title already present and the policy is `ignore`
    Ignored(i64),
}

impl InsertOutcome {
    pub fn app_id(&self) -> i64 {
        match *self {
            InsertOutcome::Inserted(id) | InsertOutcome::Updated(id) | InsertOutcome::Ignored(id) => id,
        }
    }
}

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // App operations

    pub async fn insert_app(&self, app: AppRecord, policy: DuplicatePolicy) -> Result<InsertOutcome> {
        let outcome = self
            .conn
            .call(move |conn| {
                let existing: Option<i64> = conn
                    .query_row("SELECT app_id FROM apps WHERE title = ?1", params![app.title], |row| {
                        row.get(0)
                    })
                    .optional()?;

                if let Some(app_id) = existing {
                    if policy == DuplicatePolicy::Ignore {
                        return Ok(InsertOutcome::Ignored(app_id));
                    }
                }

                conn.execute(
                    r#"INSERT INTO apps (category, title, rating, version, review_count, downloads,
                                         age_suitability, updated_on, ads, requires_android,
                                         in_app_purchases, price, ranking_category, url, scraped_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                       ON CONFLICT(title) DO UPDATE SET
                           category = excluded.category,
                           rating = excluded.rating,
                           version = excluded.version,
                           review_count = excluded.review_count,
                           downloads = excluded.downloads,
                           age_suitability = excluded.age_suitability,
                           updated_on = excluded.updated_on,
                           ads = excluded.ads,
                           requires_android = excluded.requires_android,
                           in_app_purchases = excluded.in_app_purchases,
                           price = excluded.price,
                           ranking_category = excluded.ranking_category,
                           url = excluded.url,
                           scraped_at = excluded.scraped_at"#,
                    params![
                        app.category,
                        app.title,
                        app.rating,
                        app.version,
                        app.review_count.to_string(),
                        app.downloads.to_string(),
                        app.age_suitability,
                        app.updated_on,
                        app.ads,
                        app.requires_android,
                        app.in_app_purchases,
                        app.price,
                        app.ranking_category,
                        app.url,
                        app.scraped_at.to_rfc3339(),
                    ],
                )?;

                Ok(match existing {
                    Some(app_id) => InsertOutcome::Updated(app_id),
                    None => InsertOutcome::Inserted(conn.last_insert_rowid()),
                })
            })
            .await?;
        Ok(outcome)
    }

    pub async fn app_id_by_title(&self, title: &str) -> Result<Option<i64>> {
        let title = title.to_string();
        let app_id = self
            .conn
            .call(move |conn| {
                let app_id = conn
                    .query_row("SELECT app_id FROM apps WHERE title = ?1", params![title], |row| {
                        row.get(0)
                    })
                    .optional()?;
                Ok(app_id)
            })
            .await?;
        Ok(app_id)
    }

    pub async fn count_apps(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM apps", [], |row| row.get(0))?))
            .await?;
        Ok(count)
    }

    // Review operations

    /// Insert reviews for an existing app; returns the ones that were new.
    /// Nothing is written when `app_id` is not in the `apps` table.
    pub async fn insert_reviews(&self, app_id: i64, reviews: Vec<Review>) -> Result<Vec<Review>> {
        let inserted = self
            .conn
            .call(move |conn| {
                let exists = conn
                    .query_row("SELECT 1 FROM apps WHERE app_id = ?1", params![app_id], |_| Ok(()))
                    .optional()?
                    .is_some();
                if !exists {
                    return Ok(None);
                }

                let tx = conn.transaction()?;
                let mut inserted = Vec::new();
                {
                    let mut stmt = tx.prepare(
                        r#"INSERT OR IGNORE INTO reviews (app_id, reviewer_name, review_text, review_date, rating)
                           VALUES (?1, ?2, ?3, ?4, ?5)"#,
                    )?;
                    for review in reviews {
                        let changed = stmt.execute(params![
                            app_id,
                            review.reviewer_name,
                            review.review_text,
                            review.review_date,
                            review.rating,
                        ])?;
                        if changed == 1 {
                            inserted.push(review);
                        }
                    }
                }
                tx.commit()?;
                Ok(Some(inserted))
            })
            .await?;

        match inserted {
            Some(inserted) => {
                debug!("Stored {} new reviews for app {}", inserted.len(), app_id);
                Ok(inserted)
            }
            None => {
                warn!("App {} not in apps table, reviews dropped", app_id);
                Ok(Vec::new())
            }
        }
    }

    pub async fn count_reviews(&self, app_id: i64) -> Result<i64> {
        let count = self
            .conn
            .call(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM reviews WHERE app_id = ?1",
                    params![app_id],
                    |row| row.get(0),
                )?)
            })
            .await?;
        Ok(count)
    }
}

pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- apps table; the title is the identity key
CREATE TABLE IF NOT EXISTS apps (
    app_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    title TEXT NOT NULL UNIQUE,
    rating TEXT NOT NULL,
    version TEXT NOT NULL,
    review_count TEXT NOT NULL,
    downloads TEXT NOT NULL,
    age_suitability TEXT NOT NULL,
    updated_on TEXT NOT NULL,
    ads TEXT NOT NULL,
    requires_android TEXT NOT NULL,
    in_app_purchases TEXT NOT NULL,
    price TEXT NOT NULL,
    ranking_category TEXT,
    url TEXT NOT NULL,
    scraped_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_apps_category ON apps(category);

-- reviews table
CREATE TABLE IF NOT EXISTS reviews (
    review_id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id INTEGER NOT NULL REFERENCES apps(app_id) ON DELETE CASCADE,
    reviewer_name TEXT NOT NULL,
    review_text TEXT NOT NULL,
    review_date TEXT NOT NULL,
    rating TEXT NOT NULL,
    UNIQUE(app_id, reviewer_name, review_text)
);

CREATE INDEX IF NOT EXISTS idx_reviews_app_id ON reviews(app_id);
"#;

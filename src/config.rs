use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "playstore-scout.toml";

/// How pages are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Headless Chrome; runs click interactions
    Browser,
    /// Plain HTTP; static HTML only
    Http,
}

/// What happens when a scraped title is already in the `apps` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    Ignore,
    Update,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    /// `Category,URL` input file
    pub categories_csv: PathBuf,
    pub database: PathBuf,
    pub apps_csv: Option<PathBuf>,
    pub reviews_csv: Option<PathBuf>,
    pub json_snapshot: Option<PathBuf>,
    /// Maximum detail pages visited per category
    pub category_limit: usize,
    /// Maximum links read from one listing page (or one ranking tab)
    pub links_per_listing: usize,
    /// Walk the Top Free / Top Grossing / Top Paid tabs instead of the plain listing
    pub ranking_tabs: bool,
    pub on_duplicate: DuplicatePolicy,
    pub browser: BrowserSettings,
    pub http: HttpSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Browser,
            categories_csv: PathBuf::from("output/categories.csv"),
            database: PathBuf::from("playstore_data.db"),
            apps_csv: Some(PathBuf::from("playstore_data.csv")),
            reviews_csv: None,
            json_snapshot: None,
            category_limit: 15,
            links_per_listing: 15,
            ranking_tabs: false,
            on_duplicate: DuplicatePolicy::Ignore,
            browser: BrowserSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub sandbox: bool,
    /// Sleep after each navigation (milliseconds)
    pub page_settle_ms: u64,
    /// Sleep after each successful click (milliseconds)
    pub click_settle_ms: u64,
    /// Attempts for required clicks such as ranking tabs
    pub click_attempts: u32,
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            page_settle_ms: 2000,
            click_settle_ms: 3000,
            click_attempts: 3,
            navigation_timeout_secs: 30,
        }
    }
}

impl BrowserSettings {
    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.category_limit == 0 {
            return Err(AppError::Config("category_limit must be at least 1".into()));
        }
        if self.links_per_listing == 0 {
            return Err(AppError::Config("links_per_listing must be at least 1".into()));
        }
        if self.ranking_tabs && self.backend == Backend::Http {
            return Err(AppError::Config("ranking_tabs needs the browser backend".into()));
        }
        Ok(())
    }
}

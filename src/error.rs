use thiserror::Error;

/// Errors raised while scraping or persisting.
///
/// The first three variants are item-level: the crawler logs them and moves
/// on to the next listing or detail page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("connectivity: {0}")]
    Connectivity(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("browser: {0}")]
    Browser(String),

    #[error("database: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),
}

impl AppError {
    /// True for failures that only affect the page being visited.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            AppError::Connectivity(_) | AppError::ElementNotFound(_) | AppError::Browser(_)
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Connectivity(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_level_classification() {
        assert!(AppError::Connectivity("timeout".into()).is_item_level());
        assert!(AppError::ElementNotFound("h1 span".into()).is_item_level());
        assert!(AppError::Browser("tab crashed".into()).is_item_level());
        assert!(!AppError::Config("bad key".into()).is_item_level());
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Config(_)));
    }
}

use crate::config::HttpSettings;
use crate::error::{AppError, Result};
use crate::scrapers::traits::PageLoader;
use crate::scrapers::types::PageRequest;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Static HTML over plain HTTP. Click interactions cannot run here and are
/// skipped, so ranking tabs and expandable sections are not available.
pub struct HttpPageLoader {
    client: Client,
}

impl HttpPageLoader {
    pub fn new(settings: &HttpSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(&settings.user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, request: &PageRequest) -> Result<String> {
        debug!("Fetching URL: {}", request.url);

        if let Some(required) = request.interactions.iter().find(|i| i.required) {
            return Err(AppError::ElementNotFound(format!(
                "{} needs a browser to click",
                required.selector
            )));
        }
        if !request.interactions.is_empty() {
            debug!("Skipping {} optional clicks on {}", request.interactions.len(), request.url);
        }

        let response = self.client.get(&request.url).send().await?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", request.url, response.status());
            return Err(AppError::Connectivity(format!(
                "{} returned {}",
                request.url,
                response.status()
            )));
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn backend_name(&self) -> &'static str {
        "plain HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::types::Interaction;

    #[tokio::test]
    async fn test_required_click_is_rejected_without_network() {
        let loader = HttpPageLoader::new(&HttpSettings::default()).unwrap();
        let request = PageRequest::new("https://play.google.com/store/apps/category/TOOLS")
            .then(Interaction::required("[id=\"ct|apps_topgrossing\"]", 3));

        let err = loader.load(&request).await.unwrap_err();
        assert!(matches!(err, AppError::ElementNotFound(_)));
    }
}

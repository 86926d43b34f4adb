use crate::config::BrowserSettings;
use crate::error::{AppError, Result};
use crate::scrapers::traits::PageLoader;
use crate::scrapers::types::{Interaction, PageRequest};
use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One headless Chrome tab reused for every page visit
pub struct ChromePageLoader {
    // Keeps the Chrome process alive as long as the tab is in use
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
    page_settle: Duration,
    click_settle: Duration,
}

impl ChromePageLoader {
    /// Launch Chrome and open the tab
    pub fn new(settings: &BrowserSettings) -> anyhow::Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(settings.sandbox)
            .idle_browser_timeout(settings.navigation_timeout() * 4)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(settings.navigation_timeout());

        Ok(Self {
            browser,
            tab,
            page_settle: settings.page_settle(),
            click_settle: settings.click_settle(),
        })
    }
}

#[async_trait]
impl PageLoader for ChromePageLoader {
    async fn load(&self, request: &PageRequest) -> Result<String> {
        let tab = Arc::clone(&self.tab);
        let request = request.clone();
        let (page_settle, click_settle) = (self.page_settle, self.click_settle);

        tokio::task::spawn_blocking(move || load_blocking(&tab, &request, page_settle, click_settle))
            .await
            .map_err(|e| AppError::Browser(format!("page task failed: {}", e)))?
    }

    fn backend_name(&self) -> &'static str {
        "headless Chrome"
    }
}

fn load_blocking(
    tab: &Tab,
    request: &PageRequest,
    page_settle: Duration,
    click_settle: Duration,
) -> Result<String> {
    debug!("Navigating to {}", request.url);
    tab.navigate_to(&request.url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| AppError::Connectivity(format!("{}: {:#}", request.url, e)))?;

    // No readiness signal for client-rendered content
    thread::sleep(page_settle);

    for interaction in &request.interactions {
        run_interaction(tab, interaction, click_settle)?;
    }

    let html = tab
        .evaluate("document.documentElement.outerHTML", false)
        .map_err(|e| AppError::Browser(format!("{:#}", e)))?;

    match html.value.as_ref().and_then(|v| v.as_str()) {
        Some(html) if !html.is_empty() => Ok(html.to_string()),
        _ => Err(AppError::ElementNotFound(format!("document HTML of {}", request.url))),
    }
}

fn run_interaction(tab: &Tab, interaction: &Interaction, click_settle: Duration) -> Result<()> {
    let script = click_script(interaction)?;

    click_with_retries(interaction, click_settle, || {
        tab.evaluate(&script, false)
            .map(|result| result.value.and_then(|v| v.as_bool()).unwrap_or(false))
            .unwrap_or_else(|e| {
                debug!("Click script failed on {}: {:#}", interaction.selector, e);
                false
            })
    })
}

/// Call `click` up to `interaction.attempts` times, settling after each try.
/// A required click that never lands is `ElementNotFound`; an optional one is skipped.
fn click_with_retries(
    interaction: &Interaction,
    click_settle: Duration,
    mut click: impl FnMut() -> bool,
) -> Result<()> {
    for attempt in 1..=interaction.attempts {
        if click() {
            debug!("Clicked {}", interaction.selector);
            thread::sleep(click_settle);
            return Ok(());
        }

        if attempt < interaction.attempts {
            warn!(
                "Could not click {} (attempt {}/{})",
                interaction.selector, attempt, interaction.attempts
            );
            thread::sleep(click_settle);
        }
    }

    if interaction.required {
        Err(AppError::ElementNotFound(interaction.selector.clone()))
    } else {
        debug!("Optional {} not present, skipped", interaction.selector);
        Ok(())
    }
}

/// JS that clicks the first matching element and reports whether it did
fn click_script(interaction: &Interaction) -> Result<String> {
    let selector = serde_json::to_string(&interaction.selector)?;
    let text = serde_json::to_string(&interaction.text_contains)?;

    Ok(format!(
        r#"(() => {{
            const text = {text};
            const el = Array.from(document.querySelectorAll({selector}))
                .find(n => text === null || (n.textContent || '').includes(text));
            if (!el) return false;
            el.click();
            return true;
        }})()"#
    ))
}

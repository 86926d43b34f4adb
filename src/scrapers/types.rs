/// A click performed after navigation and before the HTML is captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// CSS selector of the candidates
    pub selector: String,
    /// Only click a candidate whose text contains this
    pub text_contains: Option<String>,
    /// Required clicks fail the page load when no candidate is found
    pub required: bool,
    /// Tries before a required click gives up
    pub attempts: u32,
}

impl Interaction {
    /// Click the first match if there is one; never fails the load
    pub fn optional(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text_contains: None,
            required: false,
            attempts: 1,
        }
    }

    /// Click the first match, retrying up to `attempts` times
    pub fn required(selector: impl Into<String>, attempts: u32) -> Self {
        Self {
            selector: selector.into(),
            text_contains: None,
            required: true,
            attempts: attempts.max(1),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_contains = Some(text.into());
        self
    }
}

/// A page to load and the clicks to run on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub interactions: Vec<Interaction>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interactions: Vec::new(),
        }
    }

    pub fn then(mut self, interaction: Interaction) -> Self {
        self.interactions.push(interaction);
        self
    }
}

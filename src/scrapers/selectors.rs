use scraper::Selector;
use std::sync::LazyLock;

// Listing pages. The ranking-tab grid comes first; the plain category grids
// are fallbacks for pages loaded without tabs.
pub const LISTING_LINKS: [&str; 3] = [
    "section[jscontroller*='IgeFAf'] div.ULeU3b.neq64b a",
    "div.zuJxTd a",
    "div.VfPpkd a",
];
pub const DETAIL_PATH: &str = "/store/apps/details";

// Detail page interactions
pub const EXPAND_BUTTON: &str = "div.VMq4uf button";
pub const SEE_ALL_REVIEWS_BUTTON: &str = "button[jscontroller='soHxf']";
pub const SEE_ALL_REVIEWS_TEXT: &str = "See all reviews";

// Labels inside "About this app" rows
pub const LABEL_VERSION: &str = "Version";
pub const LABEL_UPDATED_ON: &str = "Updated on";
pub const LABEL_REQUIRES_ANDROID: &str = "Requires Android";
pub const LABEL_IN_APP_PURCHASES: &str = "In-app purchases";

/// Compiled selectors for detail and review pages
pub struct DetailSelectors {
    pub title: Selector,
    pub heading: Selector,
    pub rating: Selector,
    pub review_count: Selector,
    pub stat_block: Selector,
    pub div: Selector,
    pub age_suitability: Selector,
    pub ads: Selector,
    pub info_row: Selector,
    pub install_button: Selector,
    pub buy_button: Selector,
    pub review_text: Selector,
    pub reviewer_name: Selector,
    pub review_date: Selector,
    pub review_rating: Selector,
}

pub static DETAIL: LazyLock<DetailSelectors> = LazyLock::new(|| DetailSelectors {
    title: parse("h1 span"),
    heading: parse("h1"),
    rating: parse("div.ClM7O div"),
    review_count: parse("div.g1rdde"),
    stat_block: parse("div.wVqUob"),
    div: parse("div"),
    age_suitability: parse("span[itemprop='contentRating']"),
    ads: parse("span.UIuSk"),
    info_row: parse("div.sMUprd"),
    install_button: parse("button[aria-label*='Install']"),
    buy_button: parse("div.u4ICaf button"),
    review_text: parse("div.h3YV2d"),
    reviewer_name: parse("div.X5PpBb"),
    review_date: parse("span.bp9Aid"),
    review_rating: parse("div.iXRFPc span[aria-hidden='true']"),
});

pub static LISTING: LazyLock<Vec<Selector>> =
    LazyLock::new(|| LISTING_LINKS.iter().map(|css| parse(css)).collect());

fn parse(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// `[id="..."]` selector; ids such as `ct|apps_topgrossing` are not valid `#id` syntax
pub fn by_id(id: &str) -> String {
    format!("[id=\"{}\"]", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selectors_compile() {
        assert_eq!(LISTING.len(), LISTING_LINKS.len());
        let _ = &DETAIL.review_rating;
        Selector::parse(&by_id("ct|apps_topselling_free")).unwrap();
        Selector::parse(EXPAND_BUTTON).unwrap();
        Selector::parse(SEE_ALL_REVIEWS_BUTTON).unwrap();
    }
}

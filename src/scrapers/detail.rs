use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::{RawAppFields, RawReview, ReviewPage};
use crate::normalize::FREE;
use crate::scrapers::selectors::{
    DETAIL, LABEL_IN_APP_PURCHASES, LABEL_REQUIRES_ANDROID, LABEL_UPDATED_ON, LABEL_VERSION,
};

/// Read every app field from a detail page. Each field is looked up on its
/// own; a missing element leaves that field `None`.
pub fn parse_detail_fields(html: &str) -> RawAppFields {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let fields = RawAppFields {
        title: page_title(root),
        rating: first_text(root, &DETAIL.rating),
        version: labelled_value(root, LABEL_VERSION),
        review_count: first_text(root, &DETAIL.review_count),
        downloads: downloads(root),
        requires_android: labelled_value(root, LABEL_REQUIRES_ANDROID),
        age_suitability: first_text(root, &DETAIL.age_suitability),
        updated_on: labelled_value(root, LABEL_UPDATED_ON),
        ads: first_text(root, &DETAIL.ads),
        in_app_purchases: labelled_value(root, LABEL_IN_APP_PURCHASES),
        price: price(root),
    };

    debug!("Extracted fields for {:?}", fields.title);
    fields
}

/// Title plus the review blocks currently rendered on the page.
///
/// Names, dates and ratings are paired with review texts by position.
pub fn parse_review_page(html: &str) -> ReviewPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let texts = all_texts(root, &DETAIL.review_text);
    let names = all_texts(root, &DETAIL.reviewer_name);
    let dates = all_texts(root, &DETAIL.review_date);
    let ratings = all_texts(root, &DETAIL.review_rating);

    let reviews = texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| RawReview {
            review_text: text,
            reviewer_name: names.get(i).cloned().flatten(),
            review_date: dates.get(i).cloned().flatten(),
            rating: ratings.get(i).cloned().flatten(),
        })
        .collect();

    ReviewPage {
        title: page_title(root),
        reviews,
    }
}

fn page_title(root: ElementRef) -> Option<String> {
    first_text(root, &DETAIL.title).or_else(|| first_text(root, &DETAIL.heading))
}

/// Second stat block ("10M+ / Downloads"), first inner div
fn downloads(root: ElementRef) -> Option<String> {
    let block = root.select(&DETAIL.stat_block).nth(1)?;
    first_text(block, &DETAIL.div)
}

/// "Free" when an install button is shown, the buy button's label when it
/// carries a dollar price, otherwise unknown
fn price(root: ElementRef) -> Option<String> {
    if root.select(&DETAIL.install_button).next().is_some() {
        return Some(FREE.to_string());
    }

    let label = root.select(&DETAIL.buy_button).next()?.value().attr("aria-label")?;
    if !label.contains('$') {
        return None;
    }
    let price = label.replace("Buy", "");
    let price = price.split_whitespace().collect::<Vec<_>>().join(" ");
    (!price.is_empty()).then_some(price)
}

/// Value cell of the "About this app" row whose label contains `label`
fn labelled_value(root: ElementRef, label: &str) -> Option<String> {
    root.select(&DETAIL.info_row).find_map(|row| {
        let mut cells = row.children().filter_map(ElementRef::wrap);
        let name = element_text(cells.next()?)?;
        if !name.contains(label) {
            return None;
        }
        element_text(cells.next()?)
    })
}

fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).find_map(element_text)
}

fn all_texts(scope: ElementRef, selector: &Selector) -> Vec<Option<String>> {
    scope.select(selector).map(element_text).collect()
}

/// Visible text with whitespace runs collapsed; `None` when empty
fn element_text(element: ElementRef) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_HTML: &str = r#"
        <html><body>
          <h1 itemprop="name"><span>Sketchbook</span></h1>
          <div class="ClM7O"><div>4.5<i>star</i></div></div>
          <div class="wVqUob"><div class="ClM7O">4.5</div><div class="g1rdde">1.2K reviews</div></div>
          <div class="wVqUob"><div class="ClM7O">10M+</div><div class="g1rdde">Downloads</div></div>
          <span itemprop="contentRating"><span>Rated for 12+</span></span>
          <span class="UIuSk">Contains ads</span>
          <button aria-label="Install on phone">Install</button>
          <div class="VMq4uf">
            <div class="sMUprd"><div class="q078ud">Version</div><div class="reAt0">6.1.2</div></div>
            <div class="sMUprd"><div class="q078ud">Updated on</div><div class="reAt0">Mar 4, 2025</div></div>
            <div class="sMUprd"><div class="q078ud">Requires Android</div><div class="reAt0">8.0 and up</div></div>
            <div class="sMUprd"><div class="q078ud">In-app purchases</div><div class="reAt0">$0.99 - $9.99 per item</div></div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_detail_fields() {
        let fields = parse_detail_fields(DETAIL_HTML);

        assert_eq!(fields.title.as_deref(), Some("Sketchbook"));
        assert_eq!(fields.rating.as_deref(), Some("4.5 star"));
        assert_eq!(fields.version.as_deref(), Some("6.1.2"));
        assert_eq!(fields.review_count.as_deref(), Some("1.2K reviews"));
        assert_eq!(fields.downloads.as_deref(), Some("10M+"));
        assert_eq!(fields.age_suitability.as_deref(), Some("Rated for 12+"));
        assert_eq!(fields.updated_on.as_deref(), Some("Mar 4, 2025"));
        assert_eq!(fields.requires_android.as_deref(), Some("8.0 and up"));
        assert_eq!(fields.ads.as_deref(), Some("Contains ads"));
        assert_eq!(fields.in_app_purchases.as_deref(), Some("$0.99 - $9.99 per item"));
        assert_eq!(fields.price.as_deref(), Some("Free"));
    }

    #[test]
    fn test_missing_elements_are_none() {
        let fields = parse_detail_fields("<html><body><h1>Bare App</h1></body></html>");

        assert_eq!(fields.title.as_deref(), Some("Bare App"));
        assert_eq!(
            fields,
            RawAppFields {
                title: Some("Bare App".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_paid_price_from_buy_button() {
        let html = r#"<div class="u4ICaf"><button aria-label="$4.99 Buy">$4.99</button></div>"#;
        assert_eq!(parse_detail_fields(html).price.as_deref(), Some("$4.99"));

        let html = r#"<div class="u4ICaf"><button aria-label="Pre-register">x</button></div>"#;
        assert_eq!(parse_detail_fields(html).price, None);
    }

    #[test]
    fn test_parse_review_page() {
        let html = r#"
            <h1><span>Sketchbook</span></h1>
            <div class="X5PpBb">Ana</div>
            <div class="iXRFPc"><span aria-hidden="true">5</span></div>
            <span class="bp9Aid">March 1, 2025</span>
            <div class="h3YV2d">Great brushes</div>
            <div class="X5PpBb">Ben</div>
            <div class="h3YV2d">Crashes on start</div>
        "#;

        let page = parse_review_page(html);
        assert_eq!(page.title.as_deref(), Some("Sketchbook"));
        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.reviews[0].reviewer_name.as_deref(), Some("Ana"));
        assert_eq!(page.reviews[0].rating.as_deref(), Some("5"));
        assert_eq!(page.reviews[0].review_date.as_deref(), Some("March 1, 2025"));
        assert_eq!(page.reviews[1].reviewer_name.as_deref(), Some("Ben"));
        assert_eq!(page.reviews[1].review_date, None);
        assert_eq!(page.reviews[1].review_text.as_deref(), Some("Crashes on start"));
    }
}

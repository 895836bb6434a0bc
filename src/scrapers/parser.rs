use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::identifier::{CardIdentity, SeriesTotals, PROMO_MARKER};

pub const DEFAULT_CONDITION: &str = "normal";

lazy_static! {
    static ref GOODS_NAME: Selector = Selector::parse("span.goods_name").unwrap();
    static ref FIGURE: Selector = Selector::parse("span.figure").unwrap();

    // "2,180円" -> 2,180
    static ref PRICE_REGEX: Regex = Regex::new(r"([\d,]+)\s*円").unwrap();

    // 〔状態A-〕 on the live site, 〔state A-〕 in transliterated listings
    static ref CONDITION_REGEX: Regex = Regex::new(r"〔(?:状態|state\s*)([^〕]+)〕").unwrap();
}

/// A price for the queried card at one condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListing {
    pub price: i32,
    pub condition: String,
}

/// Result of scanning a search results page for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The card's `{N/D}` token never appears on the page
    NotFound,
    /// The card appears; these listings matched (possibly none)
    Listings(Vec<PriceListing>),
}

impl Extraction {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Extraction::NotFound)
    }

    pub fn listings(&self) -> &[PriceListing] {
        match self {
            Extraction::NotFound => &[],
            Extraction::Listings(listings) => listings,
        }
    }

    pub fn into_listings(self) -> Vec<PriceListing> {
        match self {
            Extraction::NotFound => Vec::new(),
            Extraction::Listings(listings) => listings,
        }
    }
}

/// `{0*N/D}` for the card's number; D is any digit run so every series total
/// matches. Promo cards (by series code or by the totals table) also accept the
/// `SV-P` denominator.
pub fn card_number_pattern(
    identity: &CardIdentity,
    totals: Option<&SeriesTotals>,
) -> Result<Regex, regex::Error> {
    let denominator = if identity.is_promo(totals) {
        format!(r"(?:\d+|{})", regex::escape(PROMO_MARKER))
    } else {
        r"\d+".to_string()
    };
    let pattern = format!(
        r"(?i)\{{0*{}/{}\}}",
        regex::escape(identity.stripped_number()),
        denominator
    );
    Regex::new(&pattern)
}

/// Extract the prices of `identity` from a CardRush product-list page.
///
/// Each `span.goods_name` is a listing title. Its price is the first
/// `span.figure` inside the closest ancestor that holds no other title, so a
/// listing without a price is skipped instead of shifting every later price.
pub fn extract_prices(
    html: &str,
    identity: &CardIdentity,
    totals: Option<&SeriesTotals>,
) -> Result<Extraction, regex::Error> {
    let pattern = card_number_pattern(identity, totals)?;

    if !pattern.is_match(html) {
        tracing::debug!(
            "Card pattern {} not present in {} chars of markup",
            pattern.as_str(),
            html.len()
        );
        return Ok(Extraction::NotFound);
    }

    let document = Html::parse_document(html);
    let mut listings = Vec::new();
    let mut titles = 0;

    for title_el in document.select(&GOODS_NAME) {
        titles += 1;
        let title = title_el.text().collect::<String>();
        let title = title.trim();

        if !pattern.is_match(title) {
            continue;
        }

        let Some(price) = price_for_title(title_el) else {
            tracing::debug!("No price found for listing '{}'", title);
            continue;
        };

        listings.push(PriceListing {
            price,
            condition: parse_condition(title),
        });
    }

    tracing::debug!(
        "Matched {} of {} listings for card {}",
        listings.len(),
        titles,
        identity.card_number
    );

    Ok(Extraction::Listings(listings))
}

fn price_for_title(title: ElementRef<'_>) -> Option<i32> {
    for node in title.ancestors() {
        let Some(container) = ElementRef::wrap(node) else {
            continue;
        };

        // Climbed past this listing into the result list
        if container.select(&GOODS_NAME).count() > 1 {
            return None;
        }

        if let Some(figure) = container.select(&FIGURE).next() {
            return parse_price(&figure.text().collect::<String>());
        }
    }

    None
}

/// Parse a yen amount, dropping thousands separators
pub fn parse_price(text: &str) -> Option<i32> {
    let caps = PRICE_REGEX.captures(text)?;
    caps[1].replace(',', "").parse().ok()
}

/// Condition marker from a listing title, `"normal"` when absent
pub fn parse_condition(title: &str) -> String {
    CONDITION_REGEX
        .captures(title)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| DEFAULT_CONDITION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::identifier::SeriesTotal;

    fn listing(title: &str, price: &str) -> String {
        format!(
            r#"<div class="item_data">
                <p class="item_name"><span class="goods_name">{}</span></p>
                <div class="price"><span class="figure">{}</span></div>
            </div>"#,
            title, price
        )
    }

    fn page(items: &[String]) -> String {
        format!(
            r#"<html><body><div class="itemlist">{}</div></body></html>"#,
            items.join("\n")
        )
    }

    #[test]
    fn test_filters_unrelated_cards() {
        let html = page(&[
            listing(
                r#"〔state A-〕Foo<span class="model_number">【AR】{075/066}</span>"#,
                "350円",
            ),
            listing(
                r#"Bar<span class="model_number">【AR】{010/066}</span>"#,
                "500円",
            ),
        ]);

        let result = extract_prices(&html, &CardIdentity::new("sv4k", "75"), None).unwrap();
        assert_eq!(
            result,
            Extraction::Listings(vec![PriceListing {
                price: 350,
                condition: "A-".to_string(),
            }])
        );
    }

    #[test]
    fn test_keeps_document_order_of_matches() {
        let html = page(&[
            listing("ダストダス【AR】{075/066}", "1,200円"),
            listing("Other【AR】{076/066}", "80円"),
            listing("〔状態B〕ダストダス【AR】{075/066}", "900円"),
            listing("〔状態A-〕ダストダス【AR】{075/066}", "1,050円"),
        ]);

        let listings = extract_prices(&html, &CardIdentity::new("sv4k", "075"), None).unwrap().into_listings();
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0], PriceListing { price: 1200, condition: "normal".into() });
        assert_eq!(listings[1], PriceListing { price: 900, condition: "B".into() });
        assert_eq!(listings[2], PriceListing { price: 1050, condition: "A-".into() });
    }

    #[test]
    fn test_not_found_short_circuit() {
        let html = page(&[listing("Bar【AR】{010/066}", "500円")]);
        let result = extract_prices(&html, &CardIdentity::new("sv4k", "75"), None).unwrap();
        assert!(result.is_not_found());
        assert!(result.listings().is_empty());
    }

    #[test]
    fn test_found_but_no_priced_listing() {
        // Pattern appears in a related-items blurb but not in any priced listing
        let html = format!(
            "<p>Related: {{075/066}}</p>{}",
            page(&[listing("Bar【AR】{010/066}", "500円")])
        );
        let result = extract_prices(&html, &CardIdentity::new("sv4k", "75"), None).unwrap();
        assert_eq!(result, Extraction::Listings(vec![]));
    }

    #[test]
    fn test_listing_without_price_does_not_shift_pairs() {
        let sold_out = r#"<div class="item_data">
                <span class="goods_name">Sold out【AR】{075/066}</span>
                <div class="soldout">SOLD OUT</div>
            </div>"#
            .to_string();
        let html = page(&[
            sold_out,
            listing("〔状態B〕Foo【AR】{075/066}", "700円"),
        ]);

        let listings = extract_prices(&html, &CardIdentity::new("sv4k", "75"), None).unwrap().into_listings();
        assert_eq!(listings, vec![PriceListing { price: 700, condition: "B".into() }]);
    }

    #[test]
    fn test_number_must_match_exactly() {
        // 75 must not match 175 or 7
        let html = page(&[
            listing("A【AR】{175/190}", "100円"),
            listing("B【AR】{007/066}", "200円"),
            listing("C【AR】{75/066}", "300円"),
        ]);
        let listings = extract_prices(&html, &CardIdentity::new("sv4a", "75"), None).unwrap().into_listings();
        assert_eq!(listings, vec![PriceListing { price: 300, condition: "normal".into() }]);
    }

    #[test]
    fn test_title_with_several_tokens_is_accepted() {
        let html = page(&[listing("Set {010/066} + {075/066}", "2,000円")]);
        let listings = extract_prices(&html, &CardIdentity::new("sv4k", "75"), None).unwrap().into_listings();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, 2000);
    }

    #[test]
    fn test_promo_denominator() {
        let html = page(&[listing("ピカチュウ【PROMO】{232/SV-P}", "4,980円")]);
        let listings = extract_prices(&html, &CardIdentity::new("promo", "232"), None).unwrap().into_listings();
        assert_eq!(listings, vec![PriceListing { price: 4980, condition: "normal".into() }]);
    }

    #[test]
    fn test_promo_denominator_from_totals_table() {
        let mut totals = SeriesTotals::empty();
        totals.insert("svp", SeriesTotal::Promo);
        let card = CardIdentity::new("svp", "12");
        let html = page(&[listing("Pika【PR】{012/SV-P}", "4,980円")]);

        let listings = extract_prices(&html, &card, Some(&totals))
            .unwrap()
            .into_listings();
        assert_eq!(listings, vec![PriceListing { price: 4980, condition: "normal".into() }]);

        // Without the table the series is not known to be promo
        assert!(extract_prices(&html, &card, None).unwrap().is_not_found());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("2,180円"), Some(2180));
        assert_eq!(parse_price("350円"), Some(350));
        assert_eq!(parse_price("1,234,567円"), Some(1234567));
        assert_eq!(parse_price("SOLD OUT"), None);
    }

    #[test]
    fn test_parse_condition() {
        assert_eq!(parse_condition("〔状態A-〕ダストダス"), "A-");
        assert_eq!(parse_condition("〔state B〕Foo"), "B");
        assert_eq!(parse_condition("ダストダス【AR】{075/066}"), "normal");
    }
}

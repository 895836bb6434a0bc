//! Deterministic stand-in prices for runs without scraping.

pub const MOCK_SOURCE: &str = "mock";

/// Price in yen derived from the card id: `(Σ code units % 60) * 50 + 50`.
///
/// Always within 50..=3000 and stable for a given id.
pub fn mock_price(card_id: &str) -> i32 {
    let hash: u64 = card_id.encode_utf16().map(u64::from).sum();
    (hash % 60) as i32 * 50 + 50
}

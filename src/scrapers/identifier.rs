//! Card identifiers and the CardRush product-title convention.
//!
//! CardRush titles carry the card as `【AR】{079/078} [SV1S]`, promos as
//! `{232/SV-P}`. The same string is used as the search keyword, so the format
//! here has to match the site's titles exactly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Denominator CardRush prints for promotional cards
pub const PROMO_MARKER: &str = "SV-P";

const PROMO_SERIES: &str = "promo";
const PAD_WIDTH: usize = 3;

/// Printed total of a series, or the promo sentinel for series without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesTotal {
    Count(u32),
    Promo,
}

/// Series code (lower-cased) -> printed total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesTotals {
    totals: HashMap<String, SeriesTotal>,
}

impl SeriesTotals {
    pub fn empty() -> Self {
        Self {
            totals: HashMap::new(),
        }
    }

    pub fn insert(&mut self, series_code: &str, total: SeriesTotal) {
        self.totals.insert(series_code.to_lowercase(), total);
    }

    pub fn get(&self, series_code: &str) -> Option<SeriesTotal> {
        self.totals.get(&series_code.to_lowercase()).copied()
    }

    /// Apply `code=total` overrides such as `svp=promo,sv9=100`
    pub fn apply_overrides(&mut self, spec: &str) -> Result<(), String> {
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (code, total) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected code=total, got '{}'", entry))?;
            let total = match total.trim() {
                t if t.eq_ignore_ascii_case(PROMO_SERIES) => SeriesTotal::Promo,
                t => SeriesTotal::Count(
                    t.parse()
                        .map_err(|_| format!("invalid total '{}' for {}", t, code.trim()))?,
                ),
            };
            self.insert(code.trim(), total);
        }
        Ok(())
    }
}

impl Default for SeriesTotals {
    /// Scarlet & Violet era totals as CardRush prints them
    fn default() -> Self {
        let mut totals = Self::empty();
        for (code, count) in [
            ("sv1s", 78),
            ("sv1v", 78),
            ("sv1a", 73),
            ("sv2d", 71),
            ("sv2p", 71),
            ("sv2a", 165),
            ("sv3", 62),
            ("sv3a", 62),
            ("sv4k", 66),
            ("sv4m", 66),
            ("sv4a", 190),
            ("sv5k", 71),
            ("sv5m", 71),
            ("sv5a", 66),
            ("sv6", 64),
            ("sv6a", 64),
            ("sv7", 64),
            ("sv7a", 70),
            ("sv8", 106),
            ("sv8a", 90),
        ] {
            totals.insert(code, SeriesTotal::Count(count));
        }
        totals.insert(PROMO_SERIES, SeriesTotal::Promo);
        totals
    }
}

/// The tuple identifying a catalog card for searching and matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardIdentity {
    pub series_code: String,
    pub card_number: String,
    pub rarity: Option<String>,
    pub total_cards: Option<SeriesTotal>,
}

impl CardIdentity {
    pub fn new(series_code: impl Into<String>, card_number: impl Into<String>) -> Self {
        Self {
            series_code: series_code.into(),
            card_number: card_number.into(),
            rarity: None,
            total_cards: None,
        }
    }

    pub fn with_rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = Some(rarity.into());
        self
    }

    pub fn with_total(mut self, total: SeriesTotal) -> Self {
        self.total_cards = Some(total);
        self
    }

    /// Card number without leading zeros ("0" for an all-zero number)
    pub fn stripped_number(&self) -> &str {
        let trimmed = self.card_number.trim().trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }

    pub fn is_promo(&self, totals: Option<&SeriesTotals>) -> bool {
        self.series_code.eq_ignore_ascii_case(PROMO_SERIES)
            || self.resolve_total(totals) == Some(SeriesTotal::Promo)
    }

    /// Same card when the numbers agree and the series agree (or one side has no series)
    pub fn same_card(&self, other: &CardIdentity) -> bool {
        if self.stripped_number() != other.stripped_number() {
            return false;
        }
        let (a, b) = (self.series_code.trim(), other.series_code.trim());
        a.is_empty() || b.is_empty() || a.eq_ignore_ascii_case(b)
    }

    /// Search string using the identity's own rarity
    pub fn search_query(&self, totals: Option<&SeriesTotals>) -> String {
        format_search_query(self, self.rarity.as_deref(), totals)
    }

    fn resolve_total(&self, totals: Option<&SeriesTotals>) -> Option<SeriesTotal> {
        self.total_cards
            .or_else(|| totals.and_then(|t| t.get(&self.series_code)))
    }
}

fn pad(value: &str) -> String {
    format!("{:0>width$}", value, width = PAD_WIDTH)
}

fn rarity_prefix(rarity: Option<&str>) -> String {
    match rarity.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => format!("【{}】", r),
        None => String::new(),
    }
}

/// Build the CardRush keyword for a card.
///
/// Promo cards get `{NNN/SV-P}` with no series suffix, series with a known
/// total get `{NNN/TTT} [SERIES]`, anything else falls back to `{NNN} [SERIES]`.
/// An optional rarity is prefixed as `【R】`.
pub fn format_search_query(
    identity: &CardIdentity,
    rarity: Option<&str>,
    totals: Option<&SeriesTotals>,
) -> String {
    let number = pad(identity.stripped_number());
    let prefix = rarity_prefix(rarity);

    if identity.is_promo(totals) {
        return format!("{}{{{}/{}}}", prefix, number, PROMO_MARKER);
    }

    let series = identity.series_code.trim().to_uppercase();
    match identity.resolve_total(totals) {
        Some(SeriesTotal::Count(total)) => {
            format!("{}{{{}/{}}} [{}]", prefix, number, pad(&total.to_string()), series)
        }
        _ => format!("{}{{{}}} [{}]", prefix, number, series),
    }
}

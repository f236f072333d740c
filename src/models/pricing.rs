use serde::{Deserialize, Serialize};

/// One tier of the persisted pricing table. `max_pages` of `None` means
/// the tier is unbounded above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: i64,
    pub min_pages: i64,
    pub max_pages: Option<i64>,
    pub price_per_page: f64,
}

impl PricingRule {
    pub fn matches(&self, sheets: i64) -> bool {
        sheets >= self.min_pages && self.max_pages.map_or(true, |max| sheets <= max)
    }
}

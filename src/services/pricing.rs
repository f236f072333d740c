use std::sync::Arc;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;

/// Cost calculation against the persisted pricing store. Prices are
/// editable at runtime through the `pricing_rules` table, so every quote
/// reads the store instead of a process-local setting.
#[derive(Clone)]
pub struct PricingService {
    db: Arc<Database>,
    default_price: f64,
}

impl PricingService {
    pub fn new(db: Arc<Database>, default_price: f64) -> Self {
        Self { db, default_price }
    }

    /// Sheets of paper consumed by one copy: duplex puts two pages on a
    /// sheet, with an odd final page still occupying a full sheet.
    pub fn billable_sheets(pages: usize, duplex: bool) -> i64 {
        let pages = pages as i64;
        if duplex {
            (pages + 1) / 2
        } else {
            pages
        }
    }

    /// Total cost for printing `pages` selected pages, `copies` times.
    pub async fn quote(&self, pages: usize, copies: i64, duplex: bool) -> ApiResult<f64> {
        let total_sheets = Self::billable_sheets(pages, duplex) * copies.max(1);
        let price = self.price_per_sheet(total_sheets).await?;
        Ok(total_sheets as f64 * price)
    }

    async fn price_per_sheet(&self, sheets: i64) -> ApiResult<f64> {
        let rules = self.db.list_pricing_rules().await?;

        Ok(rules
            .iter()
            .find(|rule| rule.matches(sheets))
            .map(|rule| rule.price_per_page)
            .unwrap_or(self.default_price))
    }
}

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (order, line item) pair after normalization, the unit every
/// downstream rollup reads. Produced once per pipeline run and never
/// mutated afterwards.
///
/// All money fields are in the order's currency. `allocated_*` fields are
/// this line's proportional share of the matching order-level amount; per
/// order they sum to the order-level amount exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub order_id: i64,
    /// Shopify display name, e.g. `"#1001"`.
    pub order_name: Option<String>,
    /// Absent for guest checkouts.
    pub customer_id: Option<i64>,
    /// Calendar date in the reporting timezone.
    pub order_date: NaiveDate,
    /// Full order timestamp converted into the reporting timezone.
    pub created_at_local: DateTime<FixedOffset>,
    /// ISO 4217 currency code (e.g., `"USD"`).
    pub currency: String,
    /// Absent when the source line item carries no SKU; such rows are
    /// counted as line anomalies and left out of product rollups.
    pub sku: Option<String>,
    pub title: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// `quantity × unit_price`, before any discount.
    pub pre_discount_gross: Decimal,
    /// `pre_discount_gross − allocated_discount`.
    pub line_gross: Decimal,
    pub allocated_discount: Decimal,
    pub allocated_shipping: Decimal,
    pub allocated_tax: Decimal,
    /// Refund amount attributed to this line (direct line metadata first,
    /// proportional share of the uncovered remainder after).
    pub refunds_amount: Decimal,
    /// `line_gross − refunds_amount`. Shipping and tax are reported
    /// alongside, not subtracted.
    pub net_revenue: Decimal,
    pub is_repeat_customer: bool,
    /// `true` when the source timestamp had no offset and the configured
    /// fallback timezone was assumed.
    pub tz_fallback: bool,
}

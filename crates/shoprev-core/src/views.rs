use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline metrics over the whole reporting window. Derived from the
/// canonical rows; recomputable at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    pub total_orders: u64,
    pub total_net_revenue: Decimal,
    /// `total_net_revenue / total_orders`; `0` when there are no orders.
    pub average_order_value: Decimal,
    /// Repeat orders over the policy-dependent denominator; `0` when the
    /// denominator is empty.
    pub repeat_rate: f64,
    pub total_tax: Decimal,
    pub total_shipping: Decimal,
}

impl SummaryView {
    /// The all-zero summary an empty row set aggregates to.
    #[must_use]
    pub fn empty() -> Self {
        SummaryView {
            total_orders: 0,
            total_net_revenue: Decimal::ZERO,
            average_order_value: Decimal::ZERO,
            repeat_rate: 0.0,
            total_tax: Decimal::ZERO,
            total_shipping: Decimal::ZERO,
        }
    }
}

/// One day of the revenue time series, in the reporting timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub net_revenue: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    /// Distinct orders whose date falls on this day.
    pub orders: u64,
}

impl DailyBucket {
    /// A zero-valued bucket for a calendar day with no orders.
    #[must_use]
    pub fn zero(date: NaiveDate) -> Self {
        DailyBucket {
            date,
            net_revenue: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            orders: 0,
        }
    }
}

/// Per-SKU rollup across the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBucket {
    pub sku: String,
    /// First title seen for the SKU in input order.
    pub title: String,
    pub quantity: i64,
    pub net_revenue: Decimal,
}

//! Per-order problems the pipeline records instead of aborting on.
//!
//! Normalization never fails a whole batch over one bad record: the record
//! is excluded (or tagged) and a `Discrepancy` is appended so callers can
//! see exactly what was dropped or adjusted and decide whether to proceed.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// A required field is absent or unreadable; the order is excluded.
    #[error("order {order_id:?}: missing or invalid {field}; order excluded")]
    Schema {
        order_id: Option<i64>,
        field: &'static str,
    },

    /// The order has zero line items and contributes no rows.
    #[error("order {order_id}: no line items; order excluded")]
    EmptyOrder { order_id: i64 },

    /// Proportional rounding needed a correction larger than one minor
    /// unit. The correction is applied regardless; sums stay exact.
    #[error("order {order_id}: {field} allocation corrected by {delta}")]
    Conservation {
        order_id: i64,
        field: &'static str,
        delta: Decimal,
    },

    /// The order's timestamp carried no offset; the configured fallback
    /// timezone was assumed and the rows are flagged.
    #[error("order {order_id}: timestamp has no offset; fallback timezone assumed")]
    TimezoneFallback { order_id: i64 },

    /// A line item with zero quantity or no SKU. The row is kept and
    /// tagged, not dropped.
    #[error("order {order_id}: {reason}")]
    LineAnomaly { order_id: i64, reason: String },
}

impl Discrepancy {
    /// Short label for logging and tallies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Discrepancy::Schema { .. } => "schema",
            Discrepancy::EmptyOrder { .. } => "empty_order",
            Discrepancy::Conservation { .. } => "conservation",
            Discrepancy::TimezoneFallback { .. } => "timezone_fallback",
            Discrepancy::LineAnomaly { .. } => "line_anomaly",
        }
    }
}

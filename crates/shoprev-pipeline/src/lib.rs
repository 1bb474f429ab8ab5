//! Order normalization and aggregation.
//!
//! The pipeline turns raw order payloads into one canonical row per line
//! item, with order-level discounts, shipping, tax, and refunds spread across
//! the lines proportionally and conserved exactly, then rolls those rows up
//! into summary, daily, and per-product views. Every stage is a pure
//! function over immutable input: same orders in, byte-identical rows out.

pub mod aggregate;
pub mod allocate;
pub mod classify;
pub mod discrepancy;
pub mod normalize;

pub use aggregate::{aggregate, dense_daily, Report};
pub use allocate::allocate;
pub use classify::{classify, OrderStamp};
pub use discrepancy::Discrepancy;
pub use normalize::{normalize, sort_rows_for_report, NormalizeOptions, NormalizeOutput};

//! Admin REST API response types for the `orders.json` and `shop.json`
//! endpoints.
//!
//! ## Observed shape
//!
//! ### Money fields
//! Every monetary amount (`subtotal_price`, `total_discounts`, `total_tax`,
//! line `price`, refund transaction `amount`, ...) arrives as a decimal
//! string, e.g. `"42.00"`. The strings are carried through verbatim here and
//! parsed once, tolerantly, at the pipeline boundary: a malformed amount
//! must not sink the whole batch.
//!
//! ### `customer`
//! `null` for guest checkouts and for orders placed before customer accounts
//! were enabled. When present, `customer.id` is the only field the pipeline
//! relies on.
//!
//! ### `refunds`
//! Each refund carries `transactions` (the money actually returned; only
//! entries with `kind == "refund"` count) and `refund_line_items` (which
//! lines the refund touched, with a `subtotal` per line). Order-level
//! refunds (shipping refunds, goodwill credits) appear in `transactions`
//! with no matching line items.
//!
//! ### `shipping_lines`
//! Zero or more entries; an order's shipping charge is the sum of their
//! `price` values. Pickup orders have an empty array.
//!
//! Every field except the container arrays is optional here. The pipeline
//! validates semantics (missing `id`, missing `created_at`) per order and
//! records a discrepancy instead of failing the batch.

use serde::{Deserialize, Serialize};

/// Top-level response from `GET /admin/api/{version}/orders.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<ShopOrder>,
}

/// A single order as returned by the Admin API, before any validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopOrder {
    /// Numeric order ID. Modeled as optional so one mangled record cannot
    /// abort deserialization of the page; validated downstream.
    #[serde(default)]
    pub id: Option<i64>,

    /// Display name shown in the admin, e.g. `"#1001"`.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub order_number: Option<i64>,

    /// RFC 3339 timestamp with the shop's UTC offset, e.g.
    /// `"2024-03-01T09:30:00-06:00"`.
    #[serde(default)]
    pub created_at: Option<String>,

    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: Option<String>,

    /// Absent for guest checkouts.
    #[serde(default)]
    pub customer: Option<ShopCustomer>,

    #[serde(default)]
    pub line_items: Vec<ShopLineItem>,

    /// Pre-discount sum of line prices, as a decimal string.
    #[serde(default)]
    pub subtotal_price: Option<String>,

    /// Order-level discount total, as a decimal string.
    #[serde(default)]
    pub total_discounts: Option<String>,

    #[serde(default)]
    pub total_tax: Option<String>,

    #[serde(default)]
    pub shipping_lines: Vec<ShopShippingLine>,

    #[serde(default)]
    pub refunds: Vec<ShopRefund>,

    /// E.g. `"paid"`, `"refunded"`, `"partially_refunded"`.
    #[serde(default)]
    pub financial_status: Option<String>,

    /// E.g. `"fulfilled"`; `null` while unfulfilled.
    #[serde(default)]
    pub fulfillment_status: Option<String>,

    /// `true` for orders placed through a test gateway.
    #[serde(default)]
    pub test: bool,
}

/// The slice of the customer object the pipeline needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopCustomer {
    #[serde(default)]
    pub id: Option<i64>,
}

/// One purchased line within an order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopLineItem {
    /// Numeric line item ID; refund line items reference it.
    #[serde(default)]
    pub id: Option<i64>,

    /// May be absent or empty on stores that don't assign SKUs.
    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub variant_id: Option<i64>,

    #[serde(default)]
    pub product_id: Option<i64>,

    #[serde(default)]
    pub quantity: Option<i64>,

    /// Unit price as a decimal string.
    #[serde(default)]
    pub price: Option<String>,

    /// Discount applied to this line, as a decimal string.
    #[serde(default)]
    pub total_discount: Option<String>,
}

/// One shipping charge line; orders can carry several.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopShippingLine {
    #[serde(default)]
    pub price: Option<String>,
}

/// A refund event against an order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopRefund {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub transactions: Vec<ShopTransaction>,

    #[serde(default)]
    pub refund_line_items: Vec<ShopRefundLineItem>,
}

/// A money movement attached to a refund. Only `kind == "refund"` entries
/// represent money returned to the customer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopTransaction {
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub amount: Option<String>,
}

/// Top-level response from `GET /admin/api/{version}/shop.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopResponse {
    #[serde(default)]
    pub shop: Option<ShopInfo>,
}

/// The slice of the shop resource the pipeline cares about: where the store
/// keeps its clocks. The legacy display-string `timezone` field cannot name
/// a tzdb zone and is not carried.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopInfo {
    /// IANA timezone id, e.g. `"America/Chicago"`.
    #[serde(default)]
    pub iana_timezone: Option<String>,
}

/// A refunded portion of one line item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopRefundLineItem {
    #[serde(default)]
    pub line_item_id: Option<i64>,

    /// Refunded amount for this line, as a decimal string.
    #[serde(default)]
    pub subtotal: Option<String>,

    #[serde(default)]
    pub quantity: Option<i64>,
}

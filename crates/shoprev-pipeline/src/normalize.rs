//! Explodes raw orders into canonical per-line rows.
//!
//! Structural conversion happens here: per-order validation, timestamp
//! conversion into the reporting timezone, one [`allocate`] run per
//! order-level amount, refund attribution, and the repeat-customer flag.
//! Bad records are excluded (or tagged) and recorded as [`Discrepancy`]
//! values; a single mangled order never sinks the batch.

use std::collections::HashMap;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use shoprev_core::CanonicalRow;
use shoprev_orders::ShopOrder;

use crate::allocate::allocate_with_remainder;
use crate::classify::{classify, OrderStamp};
use crate::discrepancy::Discrepancy;

/// The slice of configuration normalization depends on.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub reporting_timezone: Tz,
    pub fallback_timezone: Tz,
    pub currency_precision: u32,
}

/// Best-effort result of a normalization run: the rows that could be built
/// plus everything that was excluded, tagged, or corrected along the way.
#[derive(Debug, Clone)]
pub struct NormalizeOutput {
    pub rows: Vec<CanonicalRow>,
    pub discrepancies: Vec<Discrepancy>,
}

/// Normalizes a batch of raw orders into canonical rows.
///
/// Orders are processed in input sequence and each order's lines stay
/// contiguous in line order, so two runs over the same input produce
/// identical output. Repeat-customer flags are computed over the whole
/// batch before any row is built.
#[must_use]
pub fn normalize(orders: &[ShopOrder], opts: &NormalizeOptions) -> NormalizeOutput {
    let mut discrepancies: Vec<Discrepancy> = Vec::new();

    // First pass: identity and instant. Orders failing here produce no rows.
    struct Prepared<'a> {
        order: &'a ShopOrder,
        order_id: i64,
        instant: DateTime<Utc>,
        tz_fallback: bool,
    }

    let mut prepared: Vec<Prepared<'_>> = Vec::with_capacity(orders.len());
    for order in orders {
        let Some(order_id) = order.id else {
            record(
                &mut discrepancies,
                Discrepancy::Schema {
                    order_id: None,
                    field: "id",
                },
            );
            continue;
        };
        let Some((instant, tz_fallback)) = order
            .created_at
            .as_deref()
            .and_then(|raw| parse_instant(raw, opts.fallback_timezone))
        else {
            record(
                &mut discrepancies,
                Discrepancy::Schema {
                    order_id: Some(order_id),
                    field: "created_at",
                },
            );
            continue;
        };
        if tz_fallback {
            record(&mut discrepancies, Discrepancy::TimezoneFallback { order_id });
        }
        prepared.push(Prepared {
            order,
            order_id,
            instant,
            tz_fallback,
        });
    }

    // "First purchase" is only knowable over the full batch; the map is
    // finished before any row is classified.
    let stamps: Vec<OrderStamp> = prepared
        .iter()
        .map(|p| OrderStamp {
            order_id: p.order_id,
            customer_id: p.order.customer.as_ref().and_then(|c| c.id),
            created_at: p.instant,
        })
        .collect();
    let repeat_by_order = classify(&stamps);

    // Second pass: explode into rows.
    let mut rows: Vec<CanonicalRow> = Vec::new();
    for p in &prepared {
        if p.order.line_items.is_empty() {
            record(
                &mut discrepancies,
                Discrepancy::EmptyOrder {
                    order_id: p.order_id,
                },
            );
            continue;
        }
        let is_repeat = repeat_by_order.get(&p.order_id).copied().unwrap_or(false);
        emit_order_rows(
            p.order,
            p.order_id,
            p.instant,
            p.tz_fallback,
            is_repeat,
            opts,
            &mut rows,
            &mut discrepancies,
        );
    }

    tracing::info!(
        orders = orders.len(),
        rows = rows.len(),
        discrepancies = discrepancies.len(),
        "normalized order batch"
    );

    NormalizeOutput { rows, discrepancies }
}

/// Sorts rows into the presentation order reports use: by order date, then
/// order id. The sort is stable, so each order's lines keep their sequence.
pub fn sort_rows_for_report(rows: &mut [CanonicalRow]) {
    rows.sort_by(|a, b| (a.order_date, a.order_id).cmp(&(b.order_date, b.order_id)));
}

/// Builds the canonical rows for one validated order.
#[allow(clippy::too_many_arguments)]
fn emit_order_rows(
    order: &ShopOrder,
    order_id: i64,
    instant: DateTime<Utc>,
    tz_fallback: bool,
    is_repeat: bool,
    opts: &NormalizeOptions,
    rows: &mut Vec<CanonicalRow>,
    discrepancies: &mut Vec<Discrepancy>,
) {
    let precision = opts.currency_precision;
    let lines = &order.line_items;

    let quantities: Vec<i64> = lines.iter().map(|li| li.quantity.unwrap_or(0)).collect();
    let unit_prices: Vec<Decimal> = lines
        .iter()
        .map(|li| parse_money(li.price.as_deref()))
        .collect();
    let gross: Vec<Decimal> = quantities
        .iter()
        .zip(&unit_prices)
        .map(|(q, p)| Decimal::from(*q) * *p)
        .collect();

    let discount_total = parse_money(order.total_discounts.as_deref());
    let shipping_total: Decimal = order
        .shipping_lines
        .iter()
        .map(|s| parse_money(s.price.as_deref()))
        .sum();
    let tax_total = parse_money(order.total_tax.as_deref());

    let discounts = allocate_checked(discount_total, &gross, precision, order_id, "discount", discrepancies);
    let shipping = allocate_checked(shipping_total, &gross, precision, order_id, "shipping", discrepancies);
    let taxes = allocate_checked(tax_total, &gross, precision, order_id, "tax", discrepancies);
    let refunds = attribute_refunds(order, &gross, precision, order_id, discrepancies);

    let local = instant.with_timezone(&opts.reporting_timezone);
    let created_at_local = local.fixed_offset();
    let order_date = local.date_naive();
    let customer_id = order.customer.as_ref().and_then(|c| c.id);
    let currency = order.currency.clone().unwrap_or_else(|| "USD".to_string());

    for (idx, li) in lines.iter().enumerate() {
        let sku = li.sku.clone().filter(|s| !s.is_empty());
        if sku.is_none() {
            record(
                discrepancies,
                Discrepancy::LineAnomaly {
                    order_id,
                    reason: format!("line {} has no SKU", idx + 1),
                },
            );
        }
        if quantities[idx] == 0 {
            record(
                discrepancies,
                Discrepancy::LineAnomaly {
                    order_id,
                    reason: format!("line {} has zero quantity", idx + 1),
                },
            );
        }

        let line_gross = gross[idx] - discounts[idx];
        rows.push(CanonicalRow {
            order_id,
            order_name: order.name.clone(),
            customer_id,
            order_date,
            created_at_local,
            currency: currency.clone(),
            sku,
            title: li.title.clone().unwrap_or_default(),
            quantity: quantities[idx],
            unit_price: unit_prices[idx],
            pre_discount_gross: gross[idx],
            line_gross,
            allocated_discount: discounts[idx],
            allocated_shipping: shipping[idx],
            allocated_tax: taxes[idx],
            refunds_amount: refunds[idx],
            net_revenue: line_gross - refunds[idx],
            is_repeat_customer: is_repeat,
            tz_fallback,
        });
    }
}

/// Runs one allocation and records a conservation discrepancy when the
/// forced correction exceeds one minor unit. The correction is applied
/// either way; per-order sums stay exact.
fn allocate_checked(
    total: Decimal,
    weights: &[Decimal],
    precision: u32,
    order_id: i64,
    field: &'static str,
    discrepancies: &mut Vec<Discrepancy>,
) -> Vec<Decimal> {
    let (shares, remainder) = allocate_with_remainder(total, weights, precision);
    let minor_unit = Decimal::new(1, precision);
    if remainder.abs() > minor_unit {
        record(
            discrepancies,
            Discrepancy::Conservation {
                order_id,
                field,
                delta: remainder,
            },
        );
    }
    shares
}

/// Attributes refund money to lines.
///
/// Refund line-item metadata is the primary path: each `subtotal` lands on
/// its own line. Whatever a refund's transaction total exceeds the matched
/// line amounts by (shipping refunds, goodwill credits, references to
/// unknown lines) goes into a pool spread proportionally by pre-discount
/// gross. A refund with no money transactions is valued by its line items.
/// Per order, the attributed amounts sum exactly to the refund total.
fn attribute_refunds(
    order: &ShopOrder,
    gross: &[Decimal],
    precision: u32,
    order_id: i64,
    discrepancies: &mut Vec<Discrepancy>,
) -> Vec<Decimal> {
    let mut per_line = vec![Decimal::ZERO; gross.len()];
    if order.refunds.is_empty() {
        return per_line;
    }

    let index_by_line_id: HashMap<i64, usize> = order
        .line_items
        .iter()
        .enumerate()
        .filter_map(|(idx, li)| li.id.map(|id| (id, idx)))
        .collect();

    let mut pool = Decimal::ZERO;
    for refund in &order.refunds {
        let has_refund_transactions = refund
            .transactions
            .iter()
            .any(|t| t.kind.as_deref() == Some("refund"));
        let transaction_total: Decimal = refund
            .transactions
            .iter()
            .filter(|t| t.kind.as_deref() == Some("refund"))
            .map(|t| parse_money(t.amount.as_deref()))
            .sum();

        let mut matched = Decimal::ZERO;
        let mut line_total = Decimal::ZERO;
        for rli in &refund.refund_line_items {
            let amount = parse_money(rli.subtotal.as_deref());
            line_total += amount;
            match rli.line_item_id.and_then(|id| index_by_line_id.get(&id)) {
                Some(&idx) => {
                    per_line[idx] += amount;
                    matched += amount;
                }
                None => {
                    record(
                        discrepancies,
                        Discrepancy::LineAnomaly {
                            order_id,
                            reason: format!(
                                "refund references unknown line item {:?}",
                                rli.line_item_id
                            ),
                        },
                    );
                }
            }
        }

        let refund_total = if has_refund_transactions {
            transaction_total
        } else {
            line_total
        };
        pool += refund_total - matched;
    }

    if !pool.is_zero() {
        let (shares, _) = allocate_with_remainder(pool, gross, precision);
        for (line, share) in per_line.iter_mut().zip(shares) {
            *line += share;
        }
    }
    per_line
}

/// Parses one money string tolerantly: absent, empty, or malformed values
/// become zero rather than failing the order.
fn parse_money(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Parses an order timestamp into a UTC instant.
///
/// RFC 3339 with offset is the expected shape. A bare timestamp without an
/// offset is interpreted in the fallback timezone and reported as such
/// (second tuple element `true`). Returns `None` for anything unparseable.
fn parse_instant(raw: &str, fallback: Tz) -> Option<(DateTime<Utc>, bool)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some((dt.with_timezone(&Utc), false));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    let instant = match fallback.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Local time inside a DST gap has no mapping; read it as UTC.
        LocalResult::None => Utc.from_utc_datetime(&naive),
    };
    Some((instant, true))
}

/// Logs a discrepancy and appends it to the run's list.
fn record(discrepancies: &mut Vec<Discrepancy>, discrepancy: Discrepancy) {
    tracing::warn!(kind = discrepancy.kind(), "{discrepancy}");
    discrepancies.push(discrepancy);
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

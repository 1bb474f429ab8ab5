//! Rollups over canonical rows: overall summary, daily series, product
//! rankings.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use shoprev_core::{CanonicalRow, DailyBucket, NullCustomerPolicy, ProductBucket, SummaryView};

/// The three derived views one aggregation run produces.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: SummaryView,
    /// Ascending by date; sparse (days without orders are absent).
    pub daily: Vec<DailyBucket>,
    /// Products by total quantity descending, ties by SKU ascending.
    pub by_units: Vec<ProductBucket>,
    /// Products by total net revenue descending, ties by SKU ascending.
    pub by_revenue: Vec<ProductBucket>,
}

/// Reduces canonical rows into the report views.
///
/// Money totals sum over rows; because per-line allocation conserves the
/// order-level amounts exactly, those sums equal the order-level sums.
/// Order counts are distinct by order id. Rows without a SKU stay in the
/// summary and daily views but are left out of the product rankings.
///
/// An empty row set yields the all-zero report; no rate or average ever
/// divides by zero.
#[must_use]
pub fn aggregate(rows: &[CanonicalRow], policy: NullCustomerPolicy) -> Report {
    struct OrderMeta {
        date: NaiveDate,
        is_repeat: bool,
        known_customer: bool,
    }

    let mut orders: HashMap<i64, OrderMeta> = HashMap::new();
    let mut daily: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    let mut products: HashMap<String, ProductBucket> = HashMap::new();

    let mut total_net = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut total_shipping = Decimal::ZERO;

    for row in rows {
        orders.entry(row.order_id).or_insert_with(|| OrderMeta {
            date: row.order_date,
            is_repeat: row.is_repeat_customer,
            known_customer: row.customer_id.is_some(),
        });

        let bucket = daily
            .entry(row.order_date)
            .or_insert_with(|| DailyBucket::zero(row.order_date));
        bucket.net_revenue += row.net_revenue;
        bucket.shipping += row.allocated_shipping;
        bucket.tax += row.allocated_tax;

        total_net += row.net_revenue;
        total_tax += row.allocated_tax;
        total_shipping += row.allocated_shipping;

        if let Some(sku) = &row.sku {
            let product = products.entry(sku.clone()).or_insert_with(|| ProductBucket {
                sku: sku.clone(),
                title: row.title.clone(),
                quantity: 0,
                net_revenue: Decimal::ZERO,
            });
            product.quantity += row.quantity;
            product.net_revenue += row.net_revenue;
        }
    }

    for meta in orders.values() {
        if let Some(bucket) = daily.get_mut(&meta.date) {
            bucket.orders += 1;
        }
    }

    let total_orders = orders.len() as u64;
    let average_order_value = if orders.is_empty() {
        Decimal::ZERO
    } else {
        total_net / Decimal::from(total_orders)
    };

    let repeat_orders = orders.values().filter(|m| m.is_repeat).count();
    let denominator = match policy {
        NullCustomerPolicy::CountAsNew => orders.len(),
        NullCustomerPolicy::Exclude => orders.values().filter(|m| m.known_customer).count(),
    };
    #[allow(clippy::cast_precision_loss)]
    let repeat_rate = if denominator == 0 {
        0.0
    } else {
        repeat_orders as f64 / denominator as f64
    };

    let mut by_units: Vec<ProductBucket> = products.values().cloned().collect();
    by_units.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.sku.cmp(&b.sku)));
    let mut by_revenue: Vec<ProductBucket> = products.into_values().collect();
    by_revenue.sort_by(|a, b| {
        b.net_revenue
            .cmp(&a.net_revenue)
            .then_with(|| a.sku.cmp(&b.sku))
    });

    Report {
        summary: SummaryView {
            total_orders,
            total_net_revenue: total_net,
            average_order_value,
            repeat_rate,
            total_tax,
            total_shipping,
        },
        daily: daily.into_values().collect(),
        by_units,
        by_revenue,
    }
}

/// Expands a sparse daily series into a dense calendar range, inserting a
/// zero bucket for every day in `[from, to]` that has no orders.
#[must_use]
pub fn dense_daily(daily: &[DailyBucket], from: NaiveDate, to: NaiveDate) -> Vec<DailyBucket> {
    let by_date: HashMap<NaiveDate, &DailyBucket> = daily.iter().map(|b| (b.date, b)).collect();
    let mut out = Vec::new();
    let mut date = from;
    while date <= to {
        out.push(
            by_date
                .get(&date)
                .map_or_else(|| DailyBucket::zero(date), |b| (*b).clone()),
        );
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }
    out
}

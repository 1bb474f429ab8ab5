//! New-vs-repeat customer classification over a full batch of orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// The slice of an order the classifier needs: identity, customer, instant.
#[derive(Debug, Clone, Copy)]
pub struct OrderStamp {
    pub order_id: i64,
    pub customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Maps each order id to whether it is a repeat purchase within the batch.
///
/// Runs in two passes. The first finds every customer's earliest order by
/// `(created_at, order_id)`; the second marks an order repeat iff its own
/// `(created_at, order_id)` is strictly greater than that minimum. The
/// first-purchase map is complete before any order is judged, so input
/// order cannot change the result. Equal timestamps break by ascending
/// order id; orders without a customer id are never repeat.
#[must_use]
pub fn classify(orders: &[OrderStamp]) -> HashMap<i64, bool> {
    let mut first_purchase: HashMap<i64, (DateTime<Utc>, i64)> = HashMap::new();
    for order in orders {
        let Some(customer_id) = order.customer_id else {
            continue;
        };
        let key = (order.created_at, order.order_id);
        first_purchase
            .entry(customer_id)
            .and_modify(|earliest| {
                if key < *earliest {
                    *earliest = key;
                }
            })
            .or_insert(key);
    }

    orders
        .iter()
        .map(|order| {
            let repeat = order
                .customer_id
                .and_then(|customer_id| first_purchase.get(&customer_id))
                .is_some_and(|earliest| (order.created_at, order.order_id) > *earliest);
            (order.order_id, repeat)
        })
        .collect()
}

//! CSV reading and writing for pipeline artifacts.
//!
//! Everything money-shaped serializes as decimal strings, so a row set
//! written here and read back is identical to the original.

use std::path::Path;

use anyhow::Context;

use shoprev_core::{CanonicalRow, DailyBucket, ProductBucket, SummaryView};

/// Writes the canonical row table.
pub fn write_rows_csv(path: &Path, rows: &[CanonicalRow]) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a canonical row table written by [`write_rows_csv`].
pub fn read_rows_csv(path: &Path) -> anyhow::Result<Vec<CanonicalRow>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: CanonicalRow =
            record.with_context(|| format!("parsing a row from {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Writes the summary as metric/value pairs, one metric per line.
pub fn write_summary_csv(path: &Path, summary: &SummaryView) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let metrics = [
        ("total_orders", summary.total_orders.to_string()),
        ("total_net_revenue", summary.total_net_revenue.to_string()),
        (
            "average_order_value",
            summary.average_order_value.round_dp(2).to_string(),
        ),
        ("repeat_rate", format!("{:.4}", summary.repeat_rate)),
        ("total_tax", summary.total_tax.to_string()),
        ("total_shipping", summary.total_shipping.to_string()),
    ];
    writer.write_record(["metric", "value"])?;
    for (metric, value) in &metrics {
        writer.write_record([*metric, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the daily revenue series.
pub fn write_daily_csv(path: &Path, daily: &[DailyBucket]) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for bucket in daily {
        writer.serialize(bucket)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the first `top_n` product buckets of an already-ranked list.
pub fn write_products_csv(
    path: &Path,
    products: &[ProductBucket],
    top_n: usize,
) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for product in products.iter().take(top_n) {
        writer.serialize(product)?;
    }
    writer.flush()?;
    Ok(())
}

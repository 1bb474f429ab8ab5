//! The `report` stage: canonical rows in, report tables out.

use shoprev_core::{AppConfig, CanonicalRow};
use shoprev_pipeline::aggregate;

use crate::{export, paths};

/// How many products the ranking CSVs keep.
const TOP_PRODUCTS: usize = 10;

/// Aggregates canonical rows and writes the four report tables.
///
/// When `rows` is `None` the output of a previous `clean` is read off disk.
pub fn run_report(config: &AppConfig, rows: Option<Vec<CanonicalRow>>) -> anyhow::Result<()> {
    let rows = match rows {
        Some(rows) => rows,
        None => export::read_rows_csv(&paths::clean_orders(config))?,
    };

    let report = aggregate(&rows, config.null_customer_policy);

    paths::ensure_output_dir(config)?;
    export::write_summary_csv(&paths::summary(config), &report.summary)?;
    export::write_daily_csv(&paths::daily(config), &report.daily)?;
    export::write_products_csv(&paths::top_units(config), &report.by_units, TOP_PRODUCTS)?;
    export::write_products_csv(&paths::top_revenue(config), &report.by_revenue, TOP_PRODUCTS)?;

    tracing::info!(
        days = report.daily.len(),
        products = report.by_units.len(),
        path = %config.output_dir.display(),
        "wrote report tables"
    );

    let summary = &report.summary;
    println!("Orders:      {}", summary.total_orders);
    println!("Revenue:     {}", summary.total_net_revenue);
    println!("AOV:         {}", summary.average_order_value.round_dp(2));
    println!("Repeat rate: {:.1}%", summary.repeat_rate * 100.0);
    println!("Taxes:       {}", summary.total_tax);
    println!("Shipping:    {}", summary.total_shipping);

    Ok(())
}

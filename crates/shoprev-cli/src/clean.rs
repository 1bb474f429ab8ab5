//! The `clean` stage: raw order snapshot in, canonical row CSV out.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono_tz::Tz;

use shoprev_core::{AppConfig, CanonicalRow};
use shoprev_orders::ShopOrder;
use shoprev_pipeline::{normalize, sort_rows_for_report, Discrepancy, NormalizeOptions};

use crate::pull::RawSnapshot;
use crate::{export, paths};

/// Normalizes a batch of raw orders and writes `clean_orders.csv`.
///
/// When `snapshot` is `None` the artifact from a previous `pull` is read off
/// disk. Discrepancies are tallied into the log; they never fail the stage.
pub fn run_clean(
    config: &AppConfig,
    snapshot: Option<RawSnapshot>,
) -> anyhow::Result<Vec<CanonicalRow>> {
    let snapshot = match snapshot {
        Some(snapshot) => snapshot,
        None => load_snapshot(&paths::raw_orders(config))?,
    };

    let reporting_timezone =
        resolve_reporting_timezone(config, snapshot.shop_timezone.as_deref());
    let opts = NormalizeOptions {
        reporting_timezone,
        fallback_timezone: config.fallback_timezone,
        currency_precision: config.currency_precision,
    };
    let mut output = normalize(&snapshot.orders, &opts);
    sort_rows_for_report(&mut output.rows);
    log_discrepancy_tally(&output.discrepancies);

    paths::ensure_output_dir(config)?;
    let path = paths::clean_orders(config);
    export::write_rows_csv(&path, &output.rows)?;
    tracing::info!(
        rows = output.rows.len(),
        path = %path.display(),
        timezone = %reporting_timezone,
        "wrote canonical rows"
    );

    Ok(output.rows)
}

/// Reads a `raw_orders.json` snapshot back off disk. Older snapshots were a
/// bare order array; both shapes load.
fn load_snapshot(path: &Path) -> anyhow::Result<RawSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {} (run `pull` first?)", path.display()))?;
    if let Ok(snapshot) = serde_json::from_str::<RawSnapshot>(&raw) {
        return Ok(snapshot);
    }
    let orders: Vec<ShopOrder> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(RawSnapshot {
        shop_timezone: None,
        orders,
    })
}

/// Explicit configuration wins; otherwise the timezone the shop reported at
/// pull time; otherwise UTC.
fn resolve_reporting_timezone(config: &AppConfig, shop_timezone: Option<&str>) -> Tz {
    if let Some(tz) = config.reporting_timezone {
        return tz;
    }
    if let Some(name) = shop_timezone {
        match name.parse::<Tz>() {
            Ok(tz) => return tz,
            Err(_) => {
                tracing::warn!(timezone = name, "shop reported an unknown timezone, using UTC");
            }
        }
    }
    chrono_tz::UTC
}

/// Logs one warning per discrepancy kind with its count.
fn log_discrepancy_tally(discrepancies: &[Discrepancy]) {
    if discrepancies.is_empty() {
        return;
    }
    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    for d in discrepancies {
        *tally.entry(d.kind()).or_insert(0) += 1;
    }
    for (kind, count) in tally {
        tracing::warn!(kind, count, "normalization discrepancies");
    }
}

#[cfg(test)]
mod tests {
    use shoprev_core::NullCustomerPolicy;

    use super::*;

    fn test_config(output_dir: &Path) -> AppConfig {
        AppConfig {
            store_domain: None,
            access_token: None,
            api_version: "2025-07".to_string(),
            days_back: 30,
            output_dir: output_dir.to_path_buf(),
            log_level: "info".to_string(),
            reporting_timezone: None,
            fallback_timezone: chrono_tz::UTC,
            currency_precision: 2,
            null_customer_policy: NullCustomerPolicy::CountAsNew,
            http_timeout_secs: 30,
            user_agent: "shoprev-test/0.1".to_string(),
            max_retries: 0,
            backoff_base_secs: 0,
            inter_request_delay_ms: 0,
            page_size: 250,
        }
    }

    const SNAPSHOT: &str = r##"{
        "shop_timezone": null,
        "orders": [
            {
                "id": 1001,
                "name": "#1001",
                "created_at": "2024-03-01T12:00:00-06:00",
                "currency": "USD",
                "customer": {"id": 500},
                "total_discounts": "10.00",
                "line_items": [
                    {"id": 1, "sku": "A", "title": "Item A", "quantity": 1, "price": "30.00"},
                    {"id": 2, "sku": "B", "title": "Item B", "quantity": 1, "price": "70.00"}
                ]
            },
            {
                "id": 1002,
                "name": "#1002",
                "created_at": "2024-03-02T12:00:00-06:00",
                "currency": "USD",
                "line_items": []
            }
        ]
    }"##;

    #[test]
    fn run_clean_normalizes_a_snapshot_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::write(paths::raw_orders(&config), SNAPSHOT).unwrap();

        let rows = run_clean(&config, None).unwrap();

        assert_eq!(rows.len(), 2, "order 1002 has no lines and is excluded");
        assert_eq!(rows[0].order_id, 1001);
        assert_eq!(rows[0].allocated_discount, "3.00".parse().unwrap());
        assert_eq!(rows[1].allocated_discount, "7.00".parse().unwrap());

        let reread = export::read_rows_csv(&paths::clean_orders(&config)).unwrap();
        assert_eq!(reread, rows, "the CSV round-trips the rows exactly");
    }

    #[test]
    fn run_clean_reads_legacy_bare_array_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let bare = r#"[{
            "id": 1001,
            "created_at": "2024-03-01T12:00:00Z",
            "line_items": [{"id": 1, "sku": "A", "title": "Item A", "quantity": 1, "price": "30.00"}]
        }]"#;
        std::fs::write(paths::raw_orders(&config), bare).unwrap();

        let rows = run_clean(&config, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_id, 1001);
    }

    #[test]
    fn run_clean_fails_when_no_snapshot_exists() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let err = run_clean(&config, None).unwrap_err();
        assert!(
            err.to_string().contains("run `pull` first"),
            "got: {err:#}"
        );
    }

    #[test]
    fn shop_timezone_applies_when_config_has_none() {
        let config = test_config(Path::new("unused"));
        // 02:00 UTC on March 1 is still the previous evening in Chicago.
        let snapshot = RawSnapshot {
            shop_timezone: Some("America/Chicago".to_string()),
            orders: serde_json::from_str(
                r#"[{
                    "id": 1,
                    "created_at": "2024-03-01T02:00:00Z",
                    "line_items": [{"id": 1, "sku": "A", "title": "A", "quantity": 1, "price": "10.00"}]
                }]"#,
            )
            .unwrap(),
        };

        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            output_dir: dir.path().to_path_buf(),
            ..config
        };
        let rows = run_clean(&config, Some(snapshot)).unwrap();
        assert_eq!(
            rows[0].order_date,
            chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn configured_timezone_overrides_the_shop() {
        assert_eq!(
            resolve_reporting_timezone(
                &AppConfig {
                    reporting_timezone: Some(chrono_tz::UTC),
                    ..test_config(Path::new("unused"))
                },
                Some("America/Chicago"),
            ),
            chrono_tz::UTC
        );
    }

    #[test]
    fn unknown_shop_timezone_falls_back_to_utc() {
        assert_eq!(
            resolve_reporting_timezone(
                &test_config(Path::new("unused")),
                Some("Mars/Olympus_Mons"),
            ),
            chrono_tz::UTC
        );
    }
}

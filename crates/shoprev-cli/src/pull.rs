//! The `pull` stage: fetch the reporting window and snapshot it to disk.

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use shoprev_core::AppConfig;
use shoprev_orders::{OrdersClient, OrdersError, ShopOrder};

use crate::paths;

/// What `pull` writes to `raw_orders.json`: the wire payload plus the
/// timezone the shop reported, so `clean` can convert timestamps the way
/// the store's own admin would without going back to the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// IANA timezone id from `shop.json`, when the lookup succeeded.
    #[serde(default)]
    pub shop_timezone: Option<String>,
    #[serde(default)]
    pub orders: Vec<ShopOrder>,
}

/// Fetches every order in the configured window and writes the snapshot.
/// Returns it so `run` can hand it straight to the clean stage.
pub async fn run_pull(config: &AppConfig) -> anyhow::Result<RawSnapshot> {
    let store = config
        .store_domain
        .as_deref()
        .ok_or(OrdersError::MissingCredentials {
            what: "store domain (set SHOPREV_STORE_DOMAIN)",
        })?;
    let token = config
        .access_token
        .as_deref()
        .ok_or(OrdersError::MissingCredentials {
            what: "access token (set SHOPREV_ACCESS_TOKEN)",
        })?;

    let client = OrdersClient::new(
        config.http_timeout_secs,
        &config.user_agent,
        token,
        config.max_retries,
        config.backoff_base_secs,
    )?;

    // The shop's timezone is a best-effort enrichment; a failed lookup must
    // not cost us the pull.
    let shop_timezone = match client.fetch_shop_timezone(store, &config.api_version).await {
        Ok(tz) => tz,
        Err(err) => {
            tracing::warn!(error = %err, store, "shop timezone lookup failed");
            None
        }
    };

    let created_at_min = Utc::now() - chrono::Duration::days(config.days_back);
    let orders = client
        .fetch_all_orders(
            store,
            &config.api_version,
            config.page_size,
            Some(created_at_min),
            config.inter_request_delay_ms,
        )
        .await?;

    tracing::info!(
        orders = orders.len(),
        days_back = config.days_back,
        shop_timezone = shop_timezone.as_deref().unwrap_or("unknown"),
        store,
        "pulled order window"
    );

    let snapshot = RawSnapshot {
        shop_timezone,
        orders,
    };

    paths::ensure_output_dir(config)?;
    let path = paths::raw_orders(config);
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(&path, json)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote raw order snapshot");

    Ok(snapshot)
}

use std::path::PathBuf;

use chrono_tz::Tz;

/// How orders without a customer id figure into the repeat-customer rate.
///
/// Guest checkouts carry no customer id, so they can never be repeat orders.
/// The question is whether they belong in the rate's denominator at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullCustomerPolicy {
    /// Guest orders count as new orders in the denominator (default).
    CountAsNew,
    /// Guest orders are left out of the denominator entirely; the rate is
    /// computed over orders with a known customer only.
    Exclude,
}

impl std::fmt::Display for NullCustomerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NullCustomerPolicy::CountAsNew => write!(f, "new"),
            NullCustomerPolicy::Exclude => write!(f, "exclude"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store domain, e.g. `your-store.myshopify.com`. Only `pull` needs it.
    pub store_domain: Option<String>,
    /// Admin API access token (`shpat_...`). Only `pull` needs it.
    pub access_token: Option<String>,
    /// Admin API version path segment, e.g. `2025-07`.
    pub api_version: String,
    /// Size of the reporting window in days, counted back from now.
    pub days_back: i64,
    pub output_dir: PathBuf,
    pub log_level: String,
    /// Explicit reporting timezone. When unset, the timezone the shop
    /// reported at pull time applies, then UTC.
    pub reporting_timezone: Option<Tz>,
    /// Timezone assumed for timestamps that arrive without an offset.
    pub fallback_timezone: Tz,
    /// Minor-unit digits used when rounding allocated amounts (2 for USD).
    pub currency_precision: u32,
    pub null_customer_policy: NullCustomerPolicy,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub inter_request_delay_ms: u64,
    pub page_size: u32,
}

use chrono_tz::Tz;

use crate::app_config::{AppConfig, NullCustomerPolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup. The store domain and access
/// token stay `None` until the caller needs them, and the reporting timezone
/// stays `None` so the shop's own timezone can apply; everything else has a
/// default.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_tz = |var: &str, default: &str| -> Result<Tz, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<Tz>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let store_domain = lookup("SHOPREV_STORE_DOMAIN").ok();
    let access_token = lookup("SHOPREV_ACCESS_TOKEN").ok();
    let api_version = or_default("SHOPREV_API_VERSION", "2025-07");
    let days_back = parse_i64("SHOPREV_DAYS_BACK", "30")?;
    let output_dir = PathBuf::from(or_default("SHOPREV_OUTPUT_DIR", "./output"));
    let log_level = or_default("SHOPREV_LOG_LEVEL", "info");

    // No default: unset means "use the timezone the shop reports".
    let reporting_timezone = match lookup("SHOPREV_REPORTING_TIMEZONE") {
        Ok(raw) => Some(raw.parse::<Tz>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "SHOPREV_REPORTING_TIMEZONE".to_string(),
            reason: e.to_string(),
        })?),
        Err(_) => None,
    };
    let fallback_timezone = parse_tz("SHOPREV_FALLBACK_TIMEZONE", "UTC")?;
    let currency_precision = parse_u32("SHOPREV_CURRENCY_PRECISION", "2")?;
    let null_customer_policy =
        parse_null_customer_policy(&or_default("SHOPREV_NULL_CUSTOMER_POLICY", "new"))?;

    let http_timeout_secs = parse_u64("SHOPREV_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHOPREV_USER_AGENT", "shoprev/0.1 (revenue-reporting)");
    let max_retries = parse_u32("SHOPREV_MAX_RETRIES", "3")?;
    let backoff_base_secs = parse_u64("SHOPREV_BACKOFF_BASE_SECS", "5")?;
    let inter_request_delay_ms = parse_u64("SHOPREV_INTER_REQUEST_DELAY_MS", "250")?;
    let page_size = parse_u32("SHOPREV_PAGE_SIZE", "250")?;

    Ok(AppConfig {
        store_domain,
        access_token,
        api_version,
        days_back,
        output_dir,
        log_level,
        reporting_timezone,
        fallback_timezone,
        currency_precision,
        null_customer_policy,
        http_timeout_secs,
        user_agent,
        max_retries,
        backoff_base_secs,
        inter_request_delay_ms,
        page_size,
    })
}

/// Parse the repeat-rate policy for orders without a customer id.
fn parse_null_customer_policy(s: &str) -> Result<NullCustomerPolicy, ConfigError> {
    match s {
        "new" => Ok(NullCustomerPolicy::CountAsNew),
        "exclude" => Ok(NullCustomerPolicy::Exclude),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPREV_NULL_CUSTOMER_POLICY".to_string(),
            reason: format!("unknown policy \"{other}\" (expected \"new\" or \"exclude\")"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_on_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.store_domain.is_none());
        assert!(cfg.access_token.is_none());
        assert_eq!(cfg.api_version, "2025-07");
        assert_eq!(cfg.days_back, 30);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.reporting_timezone.is_none(), "unset means shop timezone");
        assert_eq!(cfg.fallback_timezone, chrono_tz::UTC);
        assert_eq!(cfg.currency_precision, 2);
        assert_eq!(cfg.null_customer_policy, NullCustomerPolicy::CountAsNew);
        assert_eq!(cfg.http_timeout_secs, 30);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.backoff_base_secs, 5);
        assert_eq!(cfg.inter_request_delay_ms, 250);
        assert_eq!(cfg.page_size, 250);
    }

    #[test]
    fn build_app_config_reads_store_and_token() {
        let mut map = HashMap::new();
        map.insert("SHOPREV_STORE_DOMAIN", "demo.myshopify.com");
        map.insert("SHOPREV_ACCESS_TOKEN", "shpat_test");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.store_domain.as_deref(), Some("demo.myshopify.com"));
        assert_eq!(cfg.access_token.as_deref(), Some("shpat_test"));
    }

    #[test]
    fn build_app_config_parses_reporting_timezone() {
        let mut map = HashMap::new();
        map.insert("SHOPREV_REPORTING_TIMEZONE", "America/Chicago");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.reporting_timezone, Some(chrono_tz::America::Chicago));
    }

    #[test]
    fn build_app_config_rejects_invalid_timezone() {
        let mut map = HashMap::new();
        map.insert("SHOPREV_REPORTING_TIMEZONE", "Mars/Olympus_Mons");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPREV_REPORTING_TIMEZONE"),
            "expected InvalidEnvVar(SHOPREV_REPORTING_TIMEZONE), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_invalid_days_back() {
        let mut map = HashMap::new();
        map.insert("SHOPREV_DAYS_BACK", "a-month-ish");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPREV_DAYS_BACK"),
            "expected InvalidEnvVar(SHOPREV_DAYS_BACK), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_invalid_precision() {
        let mut map = HashMap::new();
        map.insert("SHOPREV_CURRENCY_PRECISION", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPREV_CURRENCY_PRECISION"),
            "expected InvalidEnvVar(SHOPREV_CURRENCY_PRECISION), got: {result:?}"
        );
    }

    #[test]
    fn parse_null_customer_policy_new() {
        assert_eq!(
            parse_null_customer_policy("new").unwrap(),
            NullCustomerPolicy::CountAsNew
        );
    }

    #[test]
    fn parse_null_customer_policy_exclude() {
        assert_eq!(
            parse_null_customer_policy("exclude").unwrap(),
            NullCustomerPolicy::Exclude
        );
    }

    #[test]
    fn parse_null_customer_policy_rejects_unknown() {
        let result = parse_null_customer_policy("maybe");
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPREV_NULL_CUSTOMER_POLICY"),
            "expected InvalidEnvVar(SHOPREV_NULL_CUSTOMER_POLICY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_override_page_size() {
        let mut map = HashMap::new();
        map.insert("SHOPREV_PAGE_SIZE", "50");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.page_size, 50);
    }
}

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;

use crate::error::OrdersError;
use crate::pagination::next_page_info;
use crate::retry::retry_with_backoff;
use crate::types::{OrdersResponse, ShopOrder, ShopResponse};

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on cycling cursors.
const MAX_PAGES: usize = 400;

/// HTTP client for the Admin REST `orders.json` and `shop.json` endpoints.
///
/// Authenticates with `X-Shopify-Access-Token`, surfaces rate limiting
/// (429), not-found (404), and other non-2xx responses as typed errors, and
/// hands back the `Link` pagination header so callers can drive multi-page
/// fetches.
///
/// Transient failures (429, network errors) are retried with exponential
/// backoff up to `max_retries` additional attempts.
pub struct OrdersClient {
    client: Client,
    access_token: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl OrdersClient {
    /// Creates an `OrdersClient` with the configured timeout, `User-Agent`,
    /// token, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        access_token: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, OrdersError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of orders, with automatic retry on transient errors.
    ///
    /// The first page (no `page_info`) carries the `created_at_min` window
    /// filter. The API rejects filters combined with a cursor, so cursor
    /// pages carry only `limit` and `page_info`.
    ///
    /// Returns the parsed page and the raw `Link` response header, if any.
    /// Pass the header to [`next_page_info`] to find out whether more pages
    /// exist.
    ///
    /// # Errors
    ///
    /// - [`OrdersError::RateLimited`]: HTTP 429 after all retries.
    /// - [`OrdersError::NotFound`]: HTTP 404 (wrong domain or API version).
    /// - [`OrdersError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`OrdersError::Http`]: network or TLS failure after all retries.
    /// - [`OrdersError::Deserialize`]: body is not a valid orders payload.
    pub async fn fetch_orders_page(
        &self,
        store_domain: &str,
        api_version: &str,
        page_size: u32,
        created_at_min: Option<DateTime<Utc>>,
        page_info: Option<&str>,
    ) -> Result<(OrdersResponse, Option<String>), OrdersError> {
        let url = orders_url(store_domain, api_version, page_size, created_at_min, page_info);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let store_domain = store_domain.to_owned();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header("X-Shopify-Access-Token", &self.access_token)
                    .send()
                    .await?;
                if let Some(err) = error_for_status(&response, &store_domain, &url) {
                    return Err(err);
                }

                // Read the Link header before the body consumes the response.
                let link_header = response
                    .headers()
                    .get(reqwest::header::LINK)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                let body = response.text().await?;
                let parsed = serde_json::from_str::<OrdersResponse>(&body).map_err(|e| {
                    OrdersError::Deserialize {
                        context: format!("orders page from {store_domain}"),
                        source: e,
                    }
                })?;

                Ok((parsed, link_header))
            }
        })
        .await
    }

    /// Fetches every order in the window by following `Link` cursors until
    /// no `rel="next"` remains.
    ///
    /// `inter_request_delay_ms` is slept between page requests (after every
    /// page except the first) to stay under the API's call budget.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_orders_page`]. Returns
    /// [`OrdersError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn fetch_all_orders(
        &self,
        store_domain: &str,
        api_version: &str,
        page_size: u32,
        created_at_min: Option<DateTime<Utc>>,
        inter_request_delay_ms: u64,
    ) -> Result<Vec<ShopOrder>, OrdersError> {
        let mut all_orders: Vec<ShopOrder> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(OrdersError::PaginationLimit {
                    store_domain: store_domain.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            if pages > 1 && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }

            let (page, link_header) = self
                .fetch_orders_page(
                    store_domain,
                    api_version,
                    page_size,
                    created_at_min,
                    cursor.as_deref(),
                )
                .await?;

            tracing::debug!(
                page = pages,
                orders = page.orders.len(),
                "fetched orders page"
            );
            all_orders.extend(page.orders);

            cursor = next_page_info(link_header.as_deref());
            if cursor.is_none() {
                break;
            }
        }

        Ok(all_orders)
    }

    /// Looks up the store's IANA timezone from the `shop.json` endpoint.
    ///
    /// Returns `None` when the shop resource carries no usable
    /// `iana_timezone`. Callers decide the fallback; the reporting pipeline
    /// treats a failed lookup as "use the configured default".
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_orders_page`]: rate limiting and
    /// network failures are retried, everything else surfaces immediately.
    pub async fn fetch_shop_timezone(
        &self,
        store_domain: &str,
        api_version: &str,
    ) -> Result<Option<String>, OrdersError> {
        let origin = store_origin(store_domain);
        let url = format!("{origin}/admin/api/{api_version}/shop.json");

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let store_domain = store_domain.to_owned();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header("X-Shopify-Access-Token", &self.access_token)
                    .send()
                    .await?;
                if let Some(err) = error_for_status(&response, &store_domain, &url) {
                    return Err(err);
                }

                let body = response.text().await?;
                let parsed = serde_json::from_str::<ShopResponse>(&body).map_err(|e| {
                    OrdersError::Deserialize {
                        context: format!("shop payload from {store_domain}"),
                        source: e,
                    }
                })?;

                Ok(parsed
                    .shop
                    .and_then(|shop| shop.iana_timezone)
                    .filter(|tz| !tz.is_empty()))
            }
        })
        .await
    }
}

/// Maps a non-2xx response to its typed error; `None` means the status is
/// fine and the body can be read.
fn error_for_status(
    response: &reqwest::Response,
    store_domain: &str,
    url: &str,
) -> Option<OrdersError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(2);
        return Some(OrdersError::RateLimited {
            domain: bare_domain(store_domain),
            retry_after_secs,
        });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Some(OrdersError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Some(OrdersError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    None
}

/// Builds the `orders.json` URL for one page.
///
/// `created_at_min` only applies to the first page; once a cursor exists it
/// encodes the filter and the API rejects repeating it.
fn orders_url(
    store_domain: &str,
    api_version: &str,
    page_size: u32,
    created_at_min: Option<DateTime<Utc>>,
    page_info: Option<&str>,
) -> String {
    let origin = store_origin(store_domain);
    let base = format!("{origin}/admin/api/{api_version}/orders.json");
    if let Some(cursor) = page_info {
        return format!("{base}?limit={page_size}&page_info={cursor}");
    }
    match created_at_min {
        Some(min) => {
            let min = min.to_rfc3339_opts(SecondsFormat::Secs, true);
            format!("{base}?limit={page_size}&created_at_min={min}")
        }
        None => format!("{base}?limit={page_size}"),
    }
}

/// Normalizes a configured store domain into a scheme+host origin.
///
/// Accepts a bare domain (`demo.myshopify.com`) or a full URL; anything past
/// the host is dropped so the Admin path is always rooted correctly.
fn store_origin(store_domain: &str) -> String {
    let (scheme, rest) = match store_domain.split_once("://") {
        Some((s, rest)) if s == "http" || s == "https" => (s, rest),
        _ => ("https", store_domain),
    };
    let host = rest.split('/').next().unwrap_or(rest);
    format!("{scheme}://{host}")
}

/// Strips scheme and path from a store domain for error messages.
fn bare_domain(store_domain: &str) -> String {
    let rest = store_domain
        .split_once("://")
        .map_or(store_domain, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest).to_owned()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

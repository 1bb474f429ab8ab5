//! Cursor pagination for the Admin API via the `Link` response header.
//!
//! Each page's response carries a `Link` header pointing at adjacent pages,
//! with the cursor encoded as a `page_info` query parameter:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2025-07/orders.json?limit=250&page_info=CURSOR>; rel="next"
//! ```
//!
//! The last page has no `rel="next"` segment. A page in the middle of the
//! result set lists both `rel="previous"` and `rel="next"`, comma-separated.

/// Extracts the `page_info` cursor for the next page from a `Link` header.
///
/// Returns `None` when no header was present, when there is no `rel="next"`
/// segment (last page), or when the next URL carries no `page_info`
/// parameter.
#[must_use]
pub fn next_page_info(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;
    header
        .split(',')
        .map(str::trim)
        .find(|segment| segment.contains(r#"rel="next""#))
        .and_then(|segment| {
            let (bracketed, _) = segment.split_once(';')?;
            let url = bracketed
                .trim()
                .strip_prefix('<')?
                .strip_suffix('>')?;
            page_info_param(url)
        })
}

/// Pulls the `page_info` value out of a URL's query string.
fn page_info_param(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "page_info" || value.is_empty() {
            return None;
        }
        // Drop a trailing fragment if one ever sneaks in.
        let value = value.split('#').next().unwrap_or(value);
        Some(value.to_owned())
    })
}

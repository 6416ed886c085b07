use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a starting location, rejecting anything that is not http(s)
pub fn parse_location(location: &str) -> UrlResult<Url> {
    let url = Url::parse(location.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    ensure_http(&url)?;
    Ok(url)
}

/// Resolves an href against the target host
///
/// Absolute URLs are returned as-is; anything else (`/u2/ulist?p=2`,
/// `?p=2`) is joined onto `host`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vndb_export::url::resolve_href;
///
/// let host = Url::parse("https://vndb.org").unwrap();
/// let url = resolve_href(&host, "/u2/ulist?p=2").unwrap();
/// assert_eq!(url.as_str(), "https://vndb.org/u2/ulist?p=2");
/// ```
pub fn resolve_href(host: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Parse("empty href".to_string()));
    }

    let url = host
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    ensure_http(&url)?;
    Ok(url)
}

/// Derives the length-vote list URL from a user list URL
///
/// Everything from `ulist` to the end is replaced, so filters and paging on
/// the user list do not carry over.
///
/// # Examples
///
/// ```
/// use vndb_export::url::lengthvotes_url;
///
/// let url = lengthvotes_url("https://vndb.org/u2/ulist?vnlist=1&p=3").unwrap();
/// assert_eq!(url, "https://vndb.org/u2/lengthvotes");
/// ```
pub fn lengthvotes_url(ulist_url: &str) -> UrlResult<String> {
    match ulist_url.find("ulist") {
        Some(index) => Ok(format!("{}lengthvotes", &ulist_url[..index])),
        None => Err(UrlError::UnsupportedList(ulist_url.to_string())),
    }
}

fn ensure_http(url: &Url) -> UrlResult<()> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }
    Ok(())
}

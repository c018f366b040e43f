use crate::UrlError;
use url::Url;

/// Query parameters that never identify a company page
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "yclid", "_ga"];

/// Checks that a string is a usable candidate URL
///
/// A candidate must parse, use `http` or `https`, and name a host.
///
/// # Examples
///
/// ```
/// use prospect_harvest::url::validate_url;
///
/// assert!(validate_url("https://a.example/co1").is_ok());
/// assert!(validate_url("ftp://a.example/").is_err());
/// assert!(validate_url("not a url").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// Produces the canonical dedup key for a URL
///
/// Only used when `canonicalize-urls` is enabled; by default the dedup key is
/// the exact candidate string.
///
/// # Canonicalization Steps
///
/// 1. Validate the URL (http/https with a host)
/// 2. Treat `http` and `https` alike (key uses `https`)
/// 3. Lowercase the host and drop a leading `www.`
/// 4. Remove dot segments, repeated slashes and a trailing slash (except root)
/// 5. Drop the fragment
/// 6. Drop tracking parameters (`utm_*`, `fbclid`, ...) and sort the rest
///
/// # Examples
///
/// ```
/// use prospect_harvest::url::canonical_key;
///
/// let key = canonical_key("http://WWW.A.EXAMPLE/co1/?utm_source=x#top").unwrap();
/// assert_eq!(key, "https://a.example/co1");
/// ```
pub fn canonical_key(url_str: &str) -> Result<String, UrlError> {
    let mut url = validate_url(url_str)?;

    if url.scheme() == "http" {
        url.set_scheme("https")
            .map_err(|_| UrlError::Malformed(format!("Cannot upgrade scheme of {}", url)))?;
    }

    if let Some(host) = url.host_str() {
        let mut host = host.to_lowercase();
        if let Some(stripped) = host.strip_prefix("www.") {
            host = stripped.to_string();
        }
        url.set_host(Some(&host))
            .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
    }

    let path = canonical_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if url.query().is_some() {
        let params = filtered_sorted_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    Ok(url.to_string())
}

fn canonical_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn filtered_sorted_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

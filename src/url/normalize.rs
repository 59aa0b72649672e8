use crate::UrlError;
use url::{ParseError, Url};

/// Scheme assumed when the seed is given without one
const DEFAULT_SCHEME: &str = "http";

/// Resolves a raw reference against the document it was found in
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Resolve against `base` (relative paths, `..`, scheme-relative `//host`)
/// 3. Reject anything that is not HTTP(S) after resolution
/// 4. Reject URLs without a host
/// 5. Remove the fragment (everything after #)
///
/// Host lowercasing and dot-segment removal are performed by the URL parser.
///
/// # Arguments
///
/// * `raw` - The reference exactly as found in the document
/// * `base` - The URL of the document containing the reference
///
/// # Returns
///
/// * `Ok(Url)` - Absolute, fragment-free URL
/// * `Err(UrlError)` - The reference is unusable and should be dropped
///
/// # Examples
///
/// ```
/// use sitecheck::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/docs/index.html").unwrap();
/// let url = resolve_reference("../about#team", &base).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/about");
/// ```
pub fn resolve_reference(raw: &str, base: &Url) -> Result<Url, UrlError> {
    let mut url = base.join(raw.trim())?;
    ensure_crawlable(&url)?;
    url.set_fragment(None);
    Ok(url)
}

/// Normalizes the seed URL given on the command line or in the config file
///
/// Unlike references, the seed has no base to resolve against. A seed
/// without a scheme (`example.com/docs`) is read as `http://example.com/docs`.
pub fn normalize_seed(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    let mut url = match Url::parse(raw) {
        Ok(url) if is_http(&url) => url,
        // "example.com:8080/x" parses with "example.com" as its scheme
        Ok(_) if !raw.contains("://") => with_default_scheme(raw)?,
        Ok(url) => return Err(UrlError::InvalidScheme(url.scheme().to_string())),
        Err(ParseError::RelativeUrlWithoutBase) => with_default_scheme(raw)?,
        Err(e) => return Err(e.into()),
    };

    ensure_crawlable(&url)?;
    url.set_fragment(None);
    Ok(url)
}

fn with_default_scheme(raw: &str) -> Result<Url, UrlError> {
    Ok(Url::parse(&format!(
        "{}://{}",
        DEFAULT_SCHEME,
        raw.trim_start_matches('/')
    ))?)
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn ensure_crawlable(url: &Url) -> Result<(), UrlError> {
    if !is_http(url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlError::MissingHost),
    }
}

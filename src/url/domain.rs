use url::Url;

/// Returns the host of a URL, with the port appended when it is not the
/// scheme's default
///
/// Two URLs are on the same site exactly when their host keys are equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecheck::url::host_key;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Checks whether `candidate` is `base` itself or one of its subdomains
///
/// Matching is done on dot boundaries, so `myexample.com` is not a subdomain
/// of `example.com`. Both arguments are expected in lowercase.
pub fn is_same_or_subdomain(candidate: &str, base: &str) -> bool {
    if candidate == base {
        return true;
    }
    candidate
        .strip_suffix(base)
        .map_or(false, |prefix| prefix.len() > 1 && prefix.ends_with('.'))
}

/// Returns the last path segment of a URL ("" for directory-style paths)
pub fn filename(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
}

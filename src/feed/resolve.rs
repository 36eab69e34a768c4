use url::Url;

/// Resolves a feed href against the page it was found on.
///
/// - An href containing `http://` or `https://` anywhere is returned as-is.
/// - An href starting with `/` is appended to `scheme://host[:port]`, including
///   a protocol-relative `//host/path`.
/// - Anything else is appended to the directory of the page path.
///
/// The page's query and fragment never take part. If `base_url` does not
/// parse, the href is returned unchanged.
///
/// ```
/// use feedscout::feed::resolve_url;
///
/// let base = "https://example.com/blog/post";
/// assert_eq!(resolve_url("feed.xml", base), "https://example.com/blog/feed.xml");
/// assert_eq!(resolve_url("/feed.xml", base), "https://example.com/feed.xml");
/// assert_eq!(resolve_url("https://other.com/f.xml", base), "https://other.com/f.xml");
/// ```
pub fn resolve_url(href: &str, base_url: &str) -> String {
    // Substring on purpose: matches hrefs like `/redirect?to=https://...` too
    if href.contains("http://") || href.contains("https://") {
        return href.to_owned();
    }

    let Ok(base) = Url::parse(base_url) else {
        return href.to_owned();
    };
    let scheme = base.scheme();
    let Some(host) = base.host_str() else {
        return href.to_owned();
    };

    let mut resolved = match base.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    };

    if !href.starts_with('/') {
        resolved.push_str(directory_of(base.path()));
        resolved.push('/');
    }
    resolved.push_str(href);
    resolved
}

/// Path with its final segment removed and without trailing slashes.
fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => path[..idx].trim_end_matches('/'),
        None => "",
    }
}

use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during target URL validation.
///
/// The first three variants are syntactic. `Localhost` and `PrivateIp` are only
/// produced by [`validate_public_url`], which layers an SSRF guard on top.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// The URL points to localhost.
    #[error("Localhost not allowed")]
    Localhost,
    /// The URL points to a private/internal IP address.
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
}

/// Validates that a string is an absolute http(s) URL with a host.
///
/// This is the check every discovery target goes through before any network
/// traffic happens.
///
/// # Errors
///
/// Returns [`UrlValidationError`] if:
/// - The URL cannot be parsed ([`UrlValidationError::InvalidUrl`])
/// - The scheme is not `http` or `https` ([`UrlValidationError::UnsupportedScheme`])
/// - There is no host ([`UrlValidationError::MissingHost`])
///
/// # Examples
///
/// ```
/// use feedscout::util::validate_url;
///
/// let url = validate_url("https://example.com/blog/post").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_url("not a url").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}

/// Validates a URL like [`validate_url`] and additionally rejects targets on
/// the local machine or a private network.
///
/// Rejected hosts:
/// - `localhost`, `127.0.0.0/8`, `::1`
/// - RFC 1918 ranges, link-local, unspecified, IPv6 unique-local
///
/// Hostnames are not resolved; only IP literals are classified.
///
/// # Examples
///
/// ```
/// use feedscout::util::validate_public_url;
///
/// assert!(validate_public_url("https://example.com/feed.xml").is_ok());
/// assert!(validate_public_url("http://localhost/feed").is_err());
/// assert!(validate_public_url("http://192.168.1.1/feed").is_err());
/// ```
pub fn validate_public_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = validate_url(url_str)?;

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::Localhost);
        }

        // Strip brackets from IPv6 addresses for parsing
        let host_for_parse = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = host_for_parse.parse::<IpAddr>() {
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_private_ip(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local() || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }
            let segments = ipv6.segments();
            // Unique Local (fc00::/7)
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            // Link-Local (fe80::/10)
            let is_link_local = (segments[0] & 0xffc0) == 0xfe80;
            is_unique_local || is_link_local
        }
    }
}

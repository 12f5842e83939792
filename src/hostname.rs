/// Hostname normalization and whitelist matching for End of Tab
use url::Url;

/// Extract the lowercase hostname from a URL
///
/// Returns `None` when the string is not a valid absolute URL or carries no
/// host at all (`about:blank`, `mailto:`, `file:///...`). Scheme, port and
/// path are discarded.
///
/// Examples:
/// - https://EXAMPLE.COM/path → example.com
/// - https://example.com:8080 → example.com
/// - not-a-url → None
pub fn normalize_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let hostname = parsed.host_str()?.to_lowercase();

    if hostname.is_empty() {
        None
    } else {
        Some(hostname)
    }
}

/// Check whether a hostname is covered by the whitelist
///
/// An entry covers its own domain and every subdomain of it. The comparison
/// is a dotted suffix match, so `notexample.com` is not covered by
/// `example.com`.
pub fn is_whitelisted<S: AsRef<str>>(hostname: &str, whitelist: &[S]) -> bool {
    let hostname = hostname.to_lowercase();

    whitelist.iter().any(|entry| {
        let domain = entry.as_ref().to_lowercase();
        hostname == domain
            || hostname
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

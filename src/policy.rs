/// Close/keep decisions for inactive tabs
///
/// Both functions are pure: they read the snapshots they are given and
/// never touch the browser.
use crate::hostname::{is_whitelisted, normalize_hostname};
use crate::tab_data::TabSnapshot;

/// Decide whether a tab is a candidate for automatic closure
///
/// Rules, first match wins:
/// 1. pinned, active or audible tabs are kept
/// 2. tabs on a whitelisted host are kept
/// 3. tabs without a recorded access time are kept
/// 4. otherwise the tab is a candidate once `now - last_accessed` is strictly
///    greater than `threshold_ms`
pub fn should_close_tab<S: AsRef<str>>(
    tab: &TabSnapshot,
    now: f64,
    threshold_ms: f64,
    whitelist: &[S],
) -> bool {
    should_close_tab_with(tab, now, threshold_ms, whitelist, normalize_hostname)
}

/// Same as [`should_close_tab`] with a caller-supplied hostname normalizer.
pub fn should_close_tab_with<S, F>(
    tab: &TabSnapshot,
    now: f64,
    threshold_ms: f64,
    whitelist: &[S],
    hostname_fn: F,
) -> bool
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    if tab.pinned || tab.active || tab.audible {
        return false;
    }

    let hostname = hostname_fn(tab.url.as_deref().unwrap_or(""));
    if hostname.is_some_and(|host| is_whitelisted(&host, whitelist)) {
        return false;
    }

    match tab.recorded_access() {
        Some(last_accessed) => now - last_accessed > threshold_ms,
        None => false,
    }
}

/// Decide whether closing `_tab` still leaves its window with a closable tab
///
/// Pinned tabs never count, so a window keeps at least one unpinned tab.
pub fn can_close_tab_in_window(_tab: &TabSnapshot, window_tabs: &[TabSnapshot]) -> bool {
    window_tabs.iter().filter(|t| !t.pinned).count() > 1
}

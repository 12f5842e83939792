/// Persisted settings for chrome.storage.local
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_TIMEOUT_MINUTES: &str = "timeoutMinutes";
pub const KEY_WHITELIST: &str = "whitelist";
pub const STORAGE_KEYS: [&str; 3] = [KEY_ENABLED, KEY_TIMEOUT_MINUTES, KEY_WHITELIST];

pub const DEFAULT_TIMEOUT_MINUTES: u32 = 30;

/// Alarm that drives the background sweep
pub const ALARM_NAME: &str = "checkInactiveTabs";
pub const ALARM_PERIOD_MINUTES: u32 = 1;

const MILLIS_PER_MINUTE: f64 = 60.0 * 1000.0;

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
        .expect("domain pattern is valid")
});

/// Extension settings, one storage key per field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: i64,
    #[serde(default)]
    pub whitelist: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_minutes() -> i64 {
    DEFAULT_TIMEOUT_MINUTES as i64
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            enabled: default_enabled(),
            timeout_minutes: default_timeout_minutes(),
            whitelist: Vec::new(),
        }
    }

    /// Timeout in minutes; a stored value that is not positive reads as the default
    pub fn effective_timeout_minutes(&self) -> u32 {
        u32::try_from(self.timeout_minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MINUTES)
    }

    /// Staleness threshold in milliseconds
    pub fn threshold_ms(&self) -> f64 {
        self.effective_timeout_minutes() as f64 * MILLIS_PER_MINUTE
    }

    /// Append a domain to the whitelist. Returns false if it was already there.
    pub fn add_domain(&mut self, domain: &str) -> bool {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() || self.whitelist.iter().any(|d| d.eq_ignore_ascii_case(&domain)) {
            return false;
        }
        self.whitelist.push(domain);
        true
    }

    pub fn remove_domain(&mut self, domain: &str) -> bool {
        let original_len = self.whitelist.len();
        self.whitelist.retain(|d| !d.eq_ignore_ascii_case(domain));
        self.whitelist.len() < original_len
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the timeout field of the popup; blank or non-positive input falls back to the default
pub fn parse_timeout_minutes(input: &str) -> u32 {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|minutes| *minutes > 0)
        .unwrap_or(DEFAULT_TIMEOUT_MINUTES)
}

/// Validate a domain typed into the popup, returning its normalized form
pub fn validate_domain(input: &str) -> Result<String, String> {
    let domain = input.trim().trim_end_matches('.').to_lowercase();

    if domain.is_empty() {
        return Err("Enter a domain such as example.com".to_string());
    }
    if domain.len() > 253 || !DOMAIN_RE.is_match(&domain) {
        return Err(format!("'{}' is not a valid domain", input.trim()));
    }

    Ok(domain)
}

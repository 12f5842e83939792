/// Data structures for End of Tab
use serde::{Deserialize, Serialize};

/// Read-only view of a browser tab as reported by `chrome.tabs.query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub id: i32,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub audible: bool,
    #[serde(default)]
    pub url: Option<String>,
    /// Milliseconds since the epoch; the browser reports fractional values
    #[serde(default)]
    pub last_accessed: Option<f64>,
    pub window_id: i32,
}

impl TabSnapshot {
    pub fn new(id: i32, window_id: i32) -> TabSnapshot {
        TabSnapshot {
            id,
            pinned: false,
            active: false,
            audible: false,
            url: None,
            last_accessed: None,
            window_id,
        }
    }

    /// Access time, or `None` when it was never recorded.
    ///
    /// Zero and NaN count as unrecorded.
    pub fn recorded_access(&self) -> Option<f64> {
        self.last_accessed
            .filter(|millis| *millis != 0.0 && !millis.is_nan())
    }
}

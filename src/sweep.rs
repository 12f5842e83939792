/// One evaluation cycle: read settings, pick inactive tabs, close them
use crate::policy::{can_close_tab_in_window, should_close_tab};
use crate::settings::Settings;
use crate::tab_data::TabSnapshot;

/// Access to the browser's tabs
#[allow(async_fn_in_trait)]
pub trait TabSource {
    async fn all_tabs(&self) -> Result<Vec<TabSnapshot>, String>;

    async fn window_tabs(&self, window_id: i32) -> Result<Vec<TabSnapshot>, String>;

    async fn close_tab(&self, tab_id: i32) -> Result<(), String>;
}

/// Access to persisted settings
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    async fn load(&self) -> Result<Settings, String>;

    async fn save(&self, settings: &Settings) -> Result<(), String>;
}

/// Outcome of a single sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub examined: usize,
    pub closed: Vec<i32>,
    /// Candidates kept because they were the last closable tab in their window
    pub guarded: Vec<i32>,
    pub failures: Vec<(i32, String)>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.guarded.is_empty() && self.failures.is_empty()
    }
}

/// Run one sweep against the browser
///
/// Returns `Ok(None)` when the extension is disabled. Errors reading settings
/// or enumerating tabs abort the sweep; a failed close is recorded and the
/// sweep moves on to the next tab.
pub async fn run_sweep<T, S>(tabs: &T, store: &S, now: f64) -> Result<Option<SweepReport>, String>
where
    T: TabSource,
    S: SettingsStore,
{
    let settings = store.load().await?;
    if !settings.enabled {
        log::debug!("Sweep skipped: disabled");
        return Ok(None);
    }

    let threshold = settings.threshold_ms();
    let all_tabs = tabs.all_tabs().await?;
    let mut report = SweepReport {
        examined: all_tabs.len(),
        ..SweepReport::default()
    };

    for tab in all_tabs.iter().filter(|t| should_close_tab(t, now, threshold, &settings.whitelist)) {
        let window_tabs = match tabs.window_tabs(tab.window_id).await {
            Ok(window_tabs) => window_tabs,
            Err(e) => {
                log::warn!("Failed to query window {}: {}", tab.window_id, e);
                report.failures.push((tab.id, e));
                continue;
            }
        };

        if !can_close_tab_in_window(tab, &window_tabs) {
            report.guarded.push(tab.id);
            continue;
        }

        match tabs.close_tab(tab.id).await {
            Ok(()) => report.closed.push(tab.id),
            Err(e) => {
                log::warn!("Failed to close tab {}: {}", tab.id, e);
                report.failures.push((tab.id, e));
            }
        }
    }

    log::info!(
        "Sweep examined {} tabs: {} closed, {} kept as last in window, {} failed",
        report.examined,
        report.closed.len(),
        report.guarded.len(),
        report.failures.len()
    );

    Ok(Some(report))
}

/// Work out which tabs a sweep would close, without touching the browser
///
/// Closures are applied to the in-memory tab set as they are decided, so the
/// window guard for a later tab sees the earlier removals.
pub fn plan_sweep(tabs: &[TabSnapshot], settings: &Settings, now: f64) -> Vec<i32> {
    if !settings.enabled {
        return Vec::new();
    }

    let threshold = settings.threshold_ms();
    let mut remaining: Vec<&TabSnapshot> = tabs.iter().collect();
    let mut close_ids = Vec::new();

    for tab in tabs {
        if !should_close_tab(tab, now, threshold, &settings.whitelist) {
            continue;
        }

        let window_tabs: Vec<TabSnapshot> = remaining
            .iter()
            .filter(|t| t.window_id == tab.window_id)
            .map(|t| (*t).clone())
            .collect();

        if can_close_tab_in_window(tab, &window_tabs) {
            close_ids.push(tab.id);
            remaining.retain(|t| t.id != tab.id);
        }
    }

    close_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashSet;

    const NOW: f64 = 1_700_000_000_000.0;
    const HOUR: f64 = 60.0 * 60.0 * 1000.0;

    struct FakeBrowser {
        tabs: RefCell<Vec<TabSnapshot>>,
        failing_closes: HashSet<i32>,
        fail_enumeration: bool,
        window_queries: RefCell<Vec<i32>>,
    }

    impl FakeBrowser {
        fn new(tabs: Vec<TabSnapshot>) -> Self {
            FakeBrowser {
                tabs: RefCell::new(tabs),
                failing_closes: HashSet::new(),
                fail_enumeration: false,
                window_queries: RefCell::new(Vec::new()),
            }
        }

        fn remaining_ids(&self) -> Vec<i32> {
            self.tabs.borrow().iter().map(|t| t.id).collect()
        }
    }

    impl TabSource for FakeBrowser {
        async fn all_tabs(&self) -> Result<Vec<TabSnapshot>, String> {
            if self.fail_enumeration {
                return Err("tabs.query failed".to_string());
            }
            Ok(self.tabs.borrow().clone())
        }

        async fn window_tabs(&self, window_id: i32) -> Result<Vec<TabSnapshot>, String> {
            self.window_queries.borrow_mut().push(window_id);
            Ok(self
                .tabs
                .borrow()
                .iter()
                .filter(|t| t.window_id == window_id)
                .cloned()
                .collect())
        }

        async fn close_tab(&self, tab_id: i32) -> Result<(), String> {
            if self.failing_closes.contains(&tab_id) {
                return Err(format!("No tab with id: {}", tab_id));
            }
            self.tabs.borrow_mut().retain(|t| t.id != tab_id);
            Ok(())
        }
    }

    struct FakeStore {
        settings: RefCell<Option<Settings>>,
    }

    impl FakeStore {
        fn with(settings: Settings) -> Self {
            FakeStore {
                settings: RefCell::new(Some(settings)),
            }
        }

        fn broken() -> Self {
            FakeStore {
                settings: RefCell::new(None),
            }
        }
    }

    impl SettingsStore for FakeStore {
        async fn load(&self) -> Result<Settings, String> {
            self.settings
                .borrow()
                .clone()
                .ok_or_else(|| "storage unavailable".to_string())
        }

        async fn save(&self, settings: &Settings) -> Result<(), String> {
            *self.settings.borrow_mut() = Some(settings.clone());
            Ok(())
        }
    }

    fn create_test_tab(id: i32, window_id: i32, url: &str, idle_ms: f64) -> TabSnapshot {
        TabSnapshot {
            url: Some(url.to_string()),
            last_accessed: Some(NOW - idle_ms),
            ..TabSnapshot::new(id, window_id)
        }
    }

    fn active_tab(id: i32, window_id: i32) -> TabSnapshot {
        TabSnapshot {
            active: true,
            ..create_test_tab(id, window_id, "https://focus.com", 0.0)
        }
    }

    #[test]
    fn test_sweep_closes_stale_tabs() {
        let browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://stale.com", 2.0 * HOUR),
            create_test_tab(3, 1, "https://fresh.com", 60_000.0),
        ]);
        let store = FakeStore::with(Settings::new());

        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(report.examined, 3);
        assert_eq!(report.closed, vec![2]);
        assert!(report.guarded.is_empty());
        assert_eq!(browser.remaining_ids(), vec![1, 3]);
    }

    #[test]
    fn test_sweep_disabled_does_nothing() {
        let browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://stale.com", 2.0 * HOUR),
        ]);
        let store = FakeStore::with(Settings {
            enabled: false,
            ..Settings::new()
        });

        let result = block_on(run_sweep(&browser, &store, NOW)).unwrap();

        assert_eq!(result, None);
        assert_eq!(browser.remaining_ids(), vec![1, 2]);
    }

    #[test]
    fn test_sweep_keeps_last_closable_tab() {
        let pinned = TabSnapshot {
            pinned: true,
            ..create_test_tab(1, 1, "https://mail.com", 0.0)
        };
        let browser = FakeBrowser::new(vec![
            pinned,
            create_test_tab(2, 1, "https://other.com", HOUR),
        ]);
        let store = FakeStore::with(Settings::new());

        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert!(report.closed.is_empty());
        assert_eq!(report.guarded, vec![2]);
        assert_eq!(browser.remaining_ids(), vec![1, 2]);
    }

    #[test]
    fn test_sweep_respects_whitelist() {
        let browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://docs.other.com", HOUR),
            create_test_tab(3, 1, "https://notother.com", HOUR),
        ]);
        let store = FakeStore::with(Settings {
            whitelist: vec!["other.com".to_string()],
            ..Settings::new()
        });

        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(report.closed, vec![3]);
        assert_eq!(browser.remaining_ids(), vec![1, 2]);
    }

    #[test]
    fn test_sweep_uses_configured_timeout() {
        let browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://a.com", 6.0 * 60_000.0),
            create_test_tab(3, 1, "https://b.com", 4.0 * 60_000.0),
        ]);
        let store = FakeStore::with(Settings {
            timeout_minutes: 5,
            ..Settings::new()
        });

        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(report.closed, vec![2]);
    }

    #[test]
    fn test_sweep_isolates_close_failures() {
        let mut browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://a.com", HOUR),
            create_test_tab(3, 1, "https://b.com", HOUR),
        ]);
        browser.failing_closes.insert(2);
        let store = FakeStore::with(Settings::new());

        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(report.closed, vec![3]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 2);
        assert_eq!(browser.remaining_ids(), vec![1, 2]);
    }

    #[test]
    fn test_sweep_queries_window_only_for_candidates() {
        let browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://fresh.com", 1000.0),
            active_tab(3, 2),
            create_test_tab(4, 2, "https://stale.com", HOUR),
        ]);
        let store = FakeStore::with(Settings::new());

        block_on(run_sweep(&browser, &store, NOW)).unwrap();

        assert_eq!(*browser.window_queries.borrow(), vec![2]);
    }

    #[test]
    fn test_sweep_sees_earlier_closures_in_window() {
        // Two stale unpinned tabs alone in a window: the first goes, the second is the last one left
        let browser = FakeBrowser::new(vec![
            create_test_tab(1, 1, "https://a.com", HOUR),
            create_test_tab(2, 1, "https://b.com", HOUR),
        ]);
        let store = FakeStore::with(Settings::new());

        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(report.closed, vec![1]);
        assert_eq!(report.guarded, vec![2]);
    }

    #[test]
    fn test_sweep_settings_failure_aborts() {
        let browser = FakeBrowser::new(vec![create_test_tab(1, 1, "https://a.com", HOUR)]);
        let store = FakeStore::broken();

        let result = block_on(run_sweep(&browser, &store, NOW));

        assert_eq!(result, Err("storage unavailable".to_string()));
        assert_eq!(browser.remaining_ids(), vec![1]);
    }

    #[test]
    fn test_sweep_enumeration_failure_aborts() {
        let mut browser = FakeBrowser::new(vec![create_test_tab(1, 1, "https://a.com", HOUR)]);
        browser.fail_enumeration = true;
        let store = FakeStore::with(Settings::new());

        let result = block_on(run_sweep(&browser, &store, NOW));

        assert!(result.is_err());
    }

    #[test]
    fn test_sweep_rereads_settings_each_time() {
        let browser = FakeBrowser::new(vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://a.com", HOUR),
        ]);
        let store = FakeStore::with(Settings {
            enabled: false,
            ..Settings::new()
        });

        assert_eq!(block_on(run_sweep(&browser, &store, NOW)), Ok(None));

        block_on(store.save(&Settings::new())).unwrap();
        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(report.closed, vec![2]);
    }

    #[test]
    fn test_plan_sweep_matches_sweep() {
        let tabs = vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://a.com", HOUR),
            create_test_tab(3, 1, "https://b.com", 1000.0),
            create_test_tab(4, 2, "https://c.com", HOUR),
            create_test_tab(5, 2, "https://d.com", HOUR),
        ];
        let settings = Settings::new();

        let planned = plan_sweep(&tabs, &settings, NOW);

        let browser = FakeBrowser::new(tabs);
        let store = FakeStore::with(settings);
        let report = block_on(run_sweep(&browser, &store, NOW)).unwrap().unwrap();

        assert_eq!(planned, vec![2, 4]);
        assert_eq!(planned, report.closed);
    }

    #[test]
    fn test_plan_sweep_disabled() {
        let tabs = vec![
            active_tab(1, 1),
            create_test_tab(2, 1, "https://a.com", HOUR),
        ];
        let settings = Settings {
            enabled: false,
            ..Settings::new()
        };

        assert!(plan_sweep(&tabs, &settings, NOW).is_empty());
    }
}

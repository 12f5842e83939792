/// chrome.* bindings behind the sweep and popup traits
use crate::settings::{STORAGE_KEYS, Settings};
use crate::sweep::{SettingsStore, TabSource};
use crate::tab_data::TabSnapshot;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryAllTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryWindowTabs(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTabUrl() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> Result<(), JsValue>;
}

/// Tabs of the running browser
pub struct ChromeTabs;

/// Settings in chrome.storage.local
pub struct ChromeStorage;

impl TabSource for ChromeTabs {
    async fn all_tabs(&self) -> Result<Vec<TabSnapshot>, String> {
        let tabs_js = queryAllTabs()
            .await
            .map_err(|e| format!("Failed to get tabs: {:?}", e))?;
        tabs_from_js(tabs_js)
    }

    async fn window_tabs(&self, window_id: i32) -> Result<Vec<TabSnapshot>, String> {
        let tabs_js = queryWindowTabs(window_id)
            .await
            .map_err(|e| format!("Failed to get tabs of window {}: {:?}", window_id, e))?;
        tabs_from_js(tabs_js)
    }

    async fn close_tab(&self, tab_id: i32) -> Result<(), String> {
        removeTab(tab_id)
            .await
            .map_err(|e| format!("Close failed: {:?}", e))
    }
}

impl SettingsStore for ChromeStorage {
    async fn load(&self) -> Result<Settings, String> {
        let keys = serde_wasm_bindgen::to_value(&STORAGE_KEYS)
            .map_err(|e| format!("Failed to serialize keys: {:?}", e))?;
        let items = getStorage(keys)
            .await
            .map_err(|e| format!("Failed to get storage: {:?}", e))?;
        settings_from_js(items)
    }

    async fn save(&self, settings: &Settings) -> Result<(), String> {
        let items = serde_wasm_bindgen::to_value(settings)
            .map_err(|e| format!("Failed to serialize settings: {:?}", e))?;

        setStorage(items)
            .await
            .map_err(|e| format!("Failed to save storage: {:?}", e))
    }
}

/// URL of the focused tab in the current window, if any
pub async fn active_tab_url() -> Result<Option<String>, String> {
    let url_js = getActiveTabUrl()
        .await
        .map_err(|e| format!("Failed to get active tab: {:?}", e))?;
    Ok(url_js.as_string())
}

fn tabs_from_js(tabs_js: JsValue) -> Result<Vec<TabSnapshot>, String> {
    serde_wasm_bindgen::from_value(tabs_js).map_err(|e| format!("Failed to parse tabs: {:?}", e))
}

fn settings_from_js(items: JsValue) -> Result<Settings, String> {
    if items.is_null() || items.is_undefined() {
        Ok(Settings::new())
    } else {
        serde_wasm_bindgen::from_value(items).map_err(|e| format!("Failed to parse settings: {:?}", e))
    }
}

/// End of Tab - Chrome Extension that closes inactive tabs
/// Built with Rust + WASM + Yew

pub mod chrome;
pub mod hostname;
pub mod policy;
pub mod settings;
pub mod sweep;
pub mod tab_data;
pub mod ui;

pub use policy::{can_close_tab_in_window, should_close_tab, should_close_tab_with};
pub use settings::Settings;
pub use sweep::{SweepReport, plan_sweep, run_sweep};
pub use tab_data::TabSnapshot;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Alarm constants for the background script
#[wasm_bindgen]
pub fn alarm_name() -> String {
    settings::ALARM_NAME.to_string()
}

#[wasm_bindgen]
pub fn alarm_period_minutes() -> u32 {
    settings::ALARM_PERIOD_MINUTES
}

// Run one sweep; called by the background script on every alarm
#[wasm_bindgen]
pub async fn check_inactive_tabs() {
    let now = js_sys::Date::now();

    match run_sweep(&chrome::ChromeTabs, &chrome::ChromeStorage, now).await {
        Ok(Some(report)) if !report.is_empty() => {
            log::debug!("Closed tabs {:?}, kept {:?}", report.closed, report.guarded);
        }
        Ok(_) => {}
        Err(e) => log::error!("[End of Tab] Alarm handler error: {}", e),
    }
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

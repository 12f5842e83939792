/// Popup UI for End of Tab

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use crate::chrome::{ChromeStorage, ChromeTabs, active_tab_url};
use crate::hostname::normalize_hostname;
use crate::settings::{Settings, parse_timeout_minutes, validate_domain};
use crate::sweep::{SettingsStore, TabSource, plan_sweep};
use crate::ui::components::{SweepPreview, WhitelistItems};

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Idle,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let settings = use_state(Settings::new);
    let preview = use_state(|| None::<usize>);
    let domain_input = use_state(String::new);
    let input_error = use_state(|| None::<String>);

    // Load settings on mount
    {
        let state = state.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match ChromeStorage.load().await {
                    Ok(loaded) => {
                        settings.set(loaded);
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(AppState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Recompute the preview whenever settings change
    {
        let preview = preview.clone();

        use_effect_with((*settings).clone(), move |current: &Settings| {
            let current = current.clone();
            spawn_local(async move {
                match ChromeTabs.all_tabs().await {
                    Ok(tabs) => {
                        let now = js_sys::Date::now();
                        preview.set(Some(plan_sweep(&tabs, &current, now).len()));
                    }
                    Err(e) => {
                        log::warn!("Preview unavailable: {}", e);
                    }
                }
            });
            || ()
        });
    }

    let on_toggle_enabled = {
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut updated = (*settings).clone();
                updated.enabled = input.checked();
                persist(updated, settings.clone(), state.clone());
            }
        })
    };

    let on_timeout_change = {
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let minutes = parse_timeout_minutes(&input.value());
                input.set_value(&minutes.to_string());

                let mut updated = (*settings).clone();
                updated.timeout_minutes = minutes as i64;
                persist(updated, settings.clone(), state.clone());
            }
        })
    };

    let on_add_current_site = {
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let settings = settings.clone();

            spawn_local(async move {
                match active_tab_url().await {
                    Ok(url) => {
                        let Some(hostname) = url.as_deref().and_then(normalize_hostname) else {
                            log::debug!("Active tab has no hostname");
                            return;
                        };
                        let mut updated = (*settings).clone();
                        if updated.add_domain(&hostname) {
                            persist(updated, settings, state);
                        }
                    }
                    Err(e) => {
                        state.set(AppState::Error(e));
                    }
                }
            });
        })
    };

    let on_domain_input = {
        let domain_input = domain_input.clone();
        let input_error = input_error.clone();

        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                domain_input.set(input.value());
                input_error.set(None);
            }
        })
    };

    let on_add_domain = {
        let state = state.clone();
        let settings = settings.clone();
        let domain_input = domain_input.clone();
        let input_error = input_error.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            match validate_domain(&domain_input) {
                Ok(domain) => {
                    let mut updated = (*settings).clone();
                    if updated.add_domain(&domain) {
                        persist(updated, settings.clone(), state.clone());
                    }
                    domain_input.set(String::new());
                }
                Err(message) => input_error.set(Some(message)),
            }
        })
    };

    let on_remove_domain = {
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |domain: String| {
            let mut updated = (*settings).clone();
            if updated.remove_domain(&domain) {
                persist(updated, settings.clone(), state.clone());
            }
        })
    };

    let is_loading = matches!(*state, AppState::Loading);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"End of Tab"}</h1>

            if let AppState::Error(err) = &*state {
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {err.clone()}
                </Alert>
            }

            if is_loading {
                <Spinner />
            }

            <div class="setting-row">
                <label for="enabled">{"Close inactive tabs"}</label>
                <input
                    id="enabled"
                    type="checkbox"
                    checked={settings.enabled}
                    disabled={is_loading}
                    onchange={on_toggle_enabled}
                />
            </div>

            <div class="setting-row">
                <label for="timeout">{"Close after (minutes)"}</label>
                <input
                    id="timeout"
                    type="number"
                    min="1"
                    class="timeout-input"
                    value={settings.effective_timeout_minutes().to_string()}
                    disabled={is_loading}
                    onchange={on_timeout_change}
                />
            </div>

            <SweepPreview count={*preview} />

            <h2 class="popup-title">{"Whitelist"}</h2>

            <Button
                onclick={on_add_current_site}
                disabled={is_loading}
                variant={ButtonVariant::Secondary}
                block={true}
            >
                {"Add current site"}
            </Button>

            <form class="domain-form" onsubmit={on_add_domain}>
                <input
                    type="text"
                    placeholder="example.com"
                    class="domain-input"
                    value={(*domain_input).clone()}
                    oninput={on_domain_input}
                    disabled={is_loading}
                />
                <button type="submit" class="pf-v5-c-button pf-m-primary" disabled={is_loading}>
                    {"Add"}
                </button>
            </form>

            if let Some(message) = &*input_error {
                <Alert r#type={AlertType::Warning} title={message.clone()} inline={true}>
                </Alert>
            }

            <WhitelistItems
                domains={settings.whitelist.clone()}
                on_remove={on_remove_domain}
                disabled={is_loading}
            />

            <p class="footer-popup">
                {"End of Tab v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

fn persist(updated: Settings, settings: UseStateHandle<Settings>, state: UseStateHandle<AppState>) {
    settings.set(updated.clone());

    spawn_local(async move {
        if let Err(e) = ChromeStorage.save(&updated).await {
            log::error!("{}", e);
            state.set(AppState::Error(e));
        }
    });
}

/// Reusable UI components

use patternfly_yew::prelude::*;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct WhitelistItemsProps {
    pub domains: Vec<String>,
    pub on_remove: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(WhitelistItems)]
pub fn whitelist_items(props: &WhitelistItemsProps) -> Html {
    if props.domains.is_empty() {
        return html! {
            <ul class="whitelist-items">
                <li class="empty">{"No sites whitelisted"}</li>
            </ul>
        };
    }

    html! {
        <ul class="whitelist-items">
            {for props.domains.iter().map(|domain| {
                html! {
                    <li key={domain.clone()}>
                        <span>{domain}</span>
                        <Button
                            onclick={props.on_remove.reform({
                                let domain = domain.clone();
                                move |_| domain.clone()
                            })}
                            variant={ButtonVariant::Danger}
                            size={ButtonSize::Small}
                            disabled={props.disabled}
                        >
                            {"×"}
                        </Button>
                    </li>
                }
            })}
        </ul>
    }
}

#[derive(Properties, PartialEq)]
pub struct PreviewProps {
    pub count: Option<usize>,
}

/// How many tabs the next sweep would close
#[function_component(SweepPreview)]
pub fn sweep_preview(props: &PreviewProps) -> Html {
    let text = match props.count {
        None => "Checking tabs...".to_string(),
        Some(0) => "No tabs would be closed right now".to_string(),
        Some(1) => "1 tab would be closed right now".to_string(),
        Some(n) => format!("{} tabs would be closed right now", n),
    };

    html! {
        <p class="preview-text">{text}</p>
    }
}

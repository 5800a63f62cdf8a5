use dioxus::prelude::*;
use futures::channel::mpsc;
use futures::StreamExt;

use coffee_common::actions::{self, StateHandle};
use coffee_common::bridge::{Bridge, NetworkStatus};
use coffee_common::config::BridgeConfig;
use coffee_common::provider::WalletProvider;
use coffee_common::state::Screen;
use coffee_common::tasks::TaskRegistry;

use super::coffee_form::CoffeeForm;
use super::injected::InjectedProvider;
use super::memo_list::MemoList;
use super::ui_state::{use_ui_state, UiState};
use super::wallet_info::WalletInfo;

pub type AppBridge = Bridge<InjectedProvider>;

pub fn use_bridge() -> AppBridge {
    use_context::<AppBridge>()
}

pub fn use_tasks() -> TaskRegistry {
    use_context::<TaskRegistry>()
}

#[component]
pub fn App() -> Element {
    let state = use_context_provider(UiState::new);
    let bridge = use_context_provider(|| {
        let config = BridgeConfig::from_env();
        let provider = InjectedProvider::detect();
        match &provider {
            Some(p) => tracing::info!(
                "Using {} wallet, contract {}",
                p.provider_name(),
                config.contract_address
            ),
            None => tracing::info!("No injected wallet; contract {}", config.contract_address),
        }
        Bridge::new(provider, config)
    });
    use_context_provider(TaskRegistry::new);

    // Page load. Subscribe first so no account change is missed, then pick
    // up an earlier authorization and load the contract state. The loop
    // ends only if there is no wallet to listen to.
    use_future(move || {
        let bridge = bridge.clone();
        async move {
            let (tx, mut rx) = mpsc::unbounded();
            if let Some(provider) = bridge.provider() {
                provider.on_accounts_changed(move |accounts| {
                    let _ = tx.unbounded_send(accounts);
                });
            }

            actions::restore_session(&bridge, &state).await;
            actions::refresh_all(&bridge, &state).await;

            while let Some(accounts) = rx.next().await {
                actions::accounts_changed(&bridge, &state, accounts).await;
            }
        }
    });

    let screen = state.read(|s| s.screen());

    rsx! {
        div { class: "coffee-app",
            header { class: "app-header",
                h1 { "Buy Me a Coffee" }
            }
            NetworkBanner {}
            main {
                match screen {
                    Screen::Connect => rsx! { ConnectPanel {} },
                    Screen::Dashboard => rsx! {
                        CoffeeForm {}
                        WalletInfo {}
                        MemoList {}
                    },
                }
            }
        }
    }
}

#[component]
fn ConnectPanel() -> Element {
    let state = use_ui_state();
    let bridge = use_bridge();
    let mut connecting = use_signal(|| false);

    let error = state.read(|s| s.connect_error().map(String::from));

    rsx! {
        div { class: "connect-panel",
            button {
                disabled: connecting(),
                onclick: move |_| {
                    let bridge = bridge.clone();
                    connecting.set(true);
                    spawn(async move {
                        actions::connect(&bridge, &state).await;
                        connecting.set(false);
                    });
                },
                "Connect Wallet"
            }
            if let Some(err) = error {
                p { class: "error", "{err}" }
            }
        }
    }
}

/// Shown while the wallet is on a network other than the configured one.
#[component]
fn NetworkBanner() -> Element {
    let state = use_ui_state();

    match state.read(|s| s.network().clone()) {
        NetworkStatus::Mismatched { active, required } => rsx! {
            div { class: "network-banner",
                "Your wallet is on chain {active}. Switch to chain {required} to use this page."
            }
        },
        _ => rsx! {},
    }
}

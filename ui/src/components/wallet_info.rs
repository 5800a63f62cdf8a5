use dioxus::prelude::*;

use coffee_common::actions::{self, StateHandle};
use coffee_common::contract::format_ether;
use coffee_common::state::OperationKind;

use super::app::{use_bridge, use_tasks};
use super::ui_state::use_ui_state;

/// Contract balance, withdraw, and recipient controls.
#[component]
pub fn WalletInfo() -> Element {
    let state = use_ui_state();
    let bridge = use_bridge();
    let tasks = use_tasks();

    let (account, view, withdraw, reassign) = state.read(|s| {
        (
            s.session(),
            s.view().clone(),
            s.pending(OperationKind::Withdraw).clone(),
            s.pending(OperationKind::Reassign).clone(),
        )
    });
    let balance = view
        .balance
        .map(|wei| format!("{} ETH", format_ether(wei)))
        .unwrap_or_else(|| "…".into());
    let recipient = view
        .recipient
        .map(|r| r.to_string())
        .unwrap_or_else(|| "the current recipient".into());
    let account = account.map(|a| a.to_string()).unwrap_or_default();

    let run = move |kind: OperationKind| {
        let bridge = bridge.clone();
        let tasks = tasks.clone();
        spawn(async move {
            match kind {
                OperationKind::Withdraw => {
                    actions::tracked(&tasks, &state, kind, actions::withdraw(&bridge, &state))
                        .await
                }
                OperationKind::Reassign => {
                    actions::tracked(
                        &tasks,
                        &state,
                        kind,
                        actions::reassign_recipient(&bridge, &state),
                    )
                    .await
                }
                OperationKind::Pay => {}
            }
        });
    };
    let run_withdraw = run.clone();
    let run_reassign = run;

    rsx! {
        div { class: "wallet-info",
            p { class: "account", "Connected: {account}" }
            h2 { "Balance: {balance}" }

            div { class: "action",
                button {
                    disabled: withdraw.is_submitting(),
                    onclick: move |_| run_withdraw(OperationKind::Withdraw),
                    if withdraw.is_submitting() {
                        span { class: "spinner" }
                    }
                    "Withdraw"
                }
                p { class: "note", "Anyone can withdraw the funds, but it will only send to {recipient}" }
                if let Some(err) = withdraw.error() {
                    p { class: "error", "{err}" }
                }
            }

            div { class: "action",
                button {
                    disabled: reassign.is_submitting(),
                    onclick: move |_| run_reassign(OperationKind::Reassign),
                    if reassign.is_submitting() {
                        span { class: "spinner" }
                    }
                    "Set me as the recipient"
                }
                p { class: "note", "Any balance still in the contract is sent to {recipient} first." }
                if let Some(err) = reassign.error() {
                    p { class: "error", "{err}" }
                }
            }
        }
    }
}

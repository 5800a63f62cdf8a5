use dioxus::prelude::*;

use coffee_common::actions::{self, StateHandle};
use coffee_common::contract::{format_ether, CoffeeSize};
use coffee_common::state::OperationKind;

use super::app::{use_bridge, use_tasks};
use super::ui_state::use_ui_state;

#[component]
pub fn CoffeeForm() -> Element {
    let state = use_ui_state();
    let bridge = use_bridge();
    let tasks = use_tasks();

    let (form, pending) = state.read(|s| (s.form().clone(), s.pending(OperationKind::Pay).clone()));
    let paying = pending.is_submitting();
    let price = format_ether(form.size.price_wei());

    rsx! {
        div { class: "coffee-form",
            h2 { "Buy a coffee" }
            div { class: "size-selector",
                for size in CoffeeSize::all().iter().copied() {
                    button {
                        key: "{size.label()}",
                        class: if size == form.size { "size selected" } else { "size" },
                        disabled: paying,
                        onclick: move |_| state.update(|s| s.set_size(size)),
                        "{size.label()}"
                    }
                }
            }
            p { class: "price", "{price} ETH" }
            div { class: "form-group",
                label { "Name" }
                input {
                    r#type: "text",
                    placeholder: "Your name",
                    disabled: paying,
                    value: "{form.name}",
                    oninput: move |evt| state.update(|s| s.set_name(evt.value())),
                }
            }
            div { class: "form-group",
                label { "Message" }
                textarea {
                    placeholder: "Say something nice",
                    disabled: paying,
                    value: "{form.message}",
                    oninput: move |evt| state.update(|s| s.set_message(evt.value())),
                }
            }
            button {
                class: "buy",
                disabled: paying,
                onclick: move |_| {
                    let bridge = bridge.clone();
                    let tasks = tasks.clone();
                    spawn(async move {
                        actions::tracked(
                            &tasks,
                            &state,
                            OperationKind::Pay,
                            actions::submit_payment(&bridge, &state),
                        )
                        .await;
                    });
                },
                if paying {
                    span { class: "spinner" }
                }
                "Buy {form.size.label()} coffee for {price} ETH"
            }
            if let Some(err) = pending.error() {
                p { class: "error", "{err}" }
            }
        }
    }
}

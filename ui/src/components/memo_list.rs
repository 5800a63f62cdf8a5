use dioxus::prelude::*;

use coffee_common::actions::{self, StateHandle};

use super::app::use_bridge;
use super::ui_state::use_ui_state;

#[component]
pub fn MemoList() -> Element {
    let state = use_ui_state();
    let bridge = use_bridge();
    let mut refreshing = use_signal(|| false);

    let payments = state.read(|s| s.view().payments.clone());

    rsx! {
        div { class: "memo-list",
            div { class: "memo-list-header",
                h2 { "Messages" }
                button {
                    disabled: refreshing(),
                    onclick: move |_| {
                        let bridge = bridge.clone();
                        refreshing.set(true);
                        spawn(async move {
                            actions::refresh_all(&bridge, &state).await;
                            refreshing.set(false);
                        });
                    },
                    "Refresh"
                }
            }
            if payments.is_empty() {
                p { class: "empty", "No coffees yet." }
            }
            for (i, memo) in payments.into_iter().enumerate() {
                div { key: "{i}", class: "memo",
                    p { class: "memo-header",
                        strong { "{memo.name}" }
                        " @ {memo.local_time()}"
                    }
                    p { class: "memo-message", "{memo.message}" }
                }
            }
        }
    }
}

use dioxus::prelude::*;

use coffee_common::actions::StateHandle;
use coffee_common::state::AppState;

/// The app state signal, shared as context. Actions write through
/// `StateHandle`; components read it and re-render on change.
#[derive(Clone, Copy)]
pub struct UiState(pub Signal<AppState>);

impl UiState {
    pub fn new() -> Self {
        Self(Signal::new(AppState::new()))
    }
}

impl StateHandle for UiState {
    fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.0.read())
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        let mut signal = self.0;
        f(&mut signal.write())
    }
}

pub fn use_ui_state() -> UiState {
    use_context::<UiState>()
}

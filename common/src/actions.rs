//! UI actions: each one calls the bridge and writes the outcome into
//! `AppState` through a `StateHandle`. Failures end up in the action's own
//! slot (or the log, for reads) and never propagate further.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use alloy_primitives::Address;

use crate::bridge::{validate_payment, Bridge, NetworkStatus};
use crate::error::BridgeError;
use crate::provider::WalletProvider;
use crate::state::{AppState, OperationKind, PendingOperation};
use crate::tasks::TaskRegistry;

/// Access to the app's state container. The UI wraps its reactive signal in
/// one of these; tests use `Rc<RefCell<AppState>>`.
pub trait StateHandle {
    fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R;
    fn update(&self, f: impl FnOnce(&mut AppState));
}

impl StateHandle for Rc<RefCell<AppState>> {
    fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.borrow())
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        f(&mut self.borrow_mut())
    }
}

// ─── Session ───────────────────────────────────────────────────────────────

/// Pick up an account the site is already authorized for. Never prompts.
pub async fn restore_session<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    match bridge.authorized_account().await {
        Ok(Some(account)) => {
            tracing::info!("Restored session for {account}");
            state.update(|s| s.set_session(Some(account)));
            ensure_network(bridge, state).await;
        }
        Ok(None) => {}
        Err(BridgeError::NoProvider) => tracing::info!("No injected wallet found"),
        Err(e) => tracing::warn!("Could not read authorized accounts: {e}"),
    }
}

pub async fn connect<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    state.update(|s| s.set_connect_error(None));
    match bridge.connect().await {
        Ok(account) => {
            tracing::info!("Connected {account}");
            state.update(|s| s.set_session(Some(account)));
            ensure_network(bridge, state).await;
        }
        Err(e) => {
            tracing::warn!("Connect failed: {e}");
            state.update(|s| s.set_connect_error(Some(e.to_string())));
        }
    }
}

pub async fn ensure_network<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    let status = bridge.ensure_network().await;
    state.update(|s| s.set_network(status));
}

/// Wallet `accountsChanged` event. Last event wins; in-flight actions are
/// left alone.
pub async fn accounts_changed<P: WalletProvider, S: StateHandle>(
    bridge: &Bridge<P>,
    state: &S,
    accounts: Vec<Address>,
) {
    match accounts.first() {
        None => {
            tracing::info!("Wallet disconnected");
            state.update(|s| {
                s.set_session(None);
                s.set_network(NetworkStatus::Unknown);
            });
        }
        Some(&account) => {
            tracing::info!("Active account changed to {account}");
            state.update(|s| s.set_session(Some(account)));
            ensure_network(bridge, state).await;
        }
    }
}

// ─── Reads ─────────────────────────────────────────────────────────────────

pub async fn refresh_recipient<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    match bridge.query_recipient().await {
        Ok(recipient) => state.update(|s| s.set_recipient(recipient)),
        Err(e) => tracing::warn!("Failed to fetch recipient: {e}"),
    }
}

pub async fn refresh_balance<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    match bridge.query_balance().await {
        Ok(balance) => state.update(|s| s.set_balance(balance)),
        Err(e) => tracing::warn!("Failed to fetch contract balance: {e}"),
    }
}

pub async fn refresh_payments<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    match bridge.query_payments().await {
        Ok(payments) => state.update(|s| s.set_payments(payments)),
        Err(e) => tracing::warn!("Failed to fetch messages: {e}"),
    }
}

/// Re-query recipient, balance, and memos. Each degrades on its own.
pub async fn refresh_all<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    refresh_recipient(bridge, state).await;
    refresh_balance(bridge, state).await;
    refresh_payments(bridge, state).await;
}

// ─── Writes ────────────────────────────────────────────────────────────────

/// Claim the slot for `kind`. `false` if it is already submitting.
fn begin<S: StateHandle>(state: &S, kind: OperationKind) -> bool {
    let busy = state.read(|s| s.pending(kind).is_submitting());
    if busy {
        tracing::debug!("{kind:?} already in flight, ignoring");
        return false;
    }
    state.update(|s| s.set_pending(kind, PendingOperation::Submitting));
    true
}

fn fail<S: StateHandle>(state: &S, kind: OperationKind, err: BridgeError) {
    tracing::warn!("{kind:?} failed: {err}");
    state.update(|s| s.set_pending(kind, PendingOperation::Failed(err.to_string())));
}

/// Buy a coffee with the form's current inputs, then re-query memos and balance.
pub async fn submit_payment<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    let kind = OperationKind::Pay;
    let (from, form, busy) = state.read(|s| {
        (
            s.session(),
            s.form().clone(),
            s.pending(kind).is_submitting(),
        )
    });
    if busy {
        return;
    }
    if let Err(e) = validate_payment(&form.name, &form.message) {
        state.update(|s| s.set_pending(kind, PendingOperation::Failed(e.to_string())));
        return;
    }
    if !begin(state, kind) {
        return;
    }

    match bridge
        .submit_payment(from, &form.name, &form.message, form.size)
        .await
    {
        Ok(_) => {
            refresh_payments(bridge, state).await;
            refresh_balance(bridge, state).await;
            state.update(|s| {
                s.set_name(String::new());
                s.set_message(String::new());
                s.set_pending(kind, PendingOperation::Idle);
            });
        }
        Err(e) => fail(state, kind, e),
    }
}

/// Withdraw everything to the current recipient, then re-query the balance.
pub async fn withdraw<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    let kind = OperationKind::Withdraw;
    if !begin(state, kind) {
        return;
    }
    let from = state.read(|s| s.session());

    match bridge.withdraw(from).await {
        Ok(_) => {
            refresh_balance(bridge, state).await;
            state.update(|s| s.set_pending(kind, PendingOperation::Idle));
        }
        Err(e) => fail(state, kind, e),
    }
}

/// Make the connected account the recipient, then re-query recipient and
/// balance (the contract flushes the balance first).
pub async fn reassign_recipient<P: WalletProvider, S: StateHandle>(bridge: &Bridge<P>, state: &S) {
    let kind = OperationKind::Reassign;
    if !begin(state, kind) {
        return;
    }
    let from = state.read(|s| s.session());

    match bridge.reassign_recipient_to_self(from).await {
        Ok(_) => {
            refresh_recipient(bridge, state).await;
            refresh_balance(bridge, state).await;
            state.update(|s| s.set_pending(kind, PendingOperation::Idle));
        }
        Err(e) => fail(state, kind, e),
    }
}

/// Run a write action under `tasks` so it can be cancelled by kind. A
/// cancelled action's slot goes back to `Idle` unless a newer action of the
/// same kind has started in the meantime.
pub async fn tracked<S, F>(tasks: &TaskRegistry, state: &S, kind: OperationKind, action: F)
where
    S: StateHandle,
    F: Future<Output = ()>,
{
    if state.read(|s| s.pending(kind).is_submitting()) {
        tracing::debug!("{kind:?} already in flight, ignoring");
        return;
    }
    if !tasks.run(kind, action).await {
        tracing::info!("{kind:?} cancelled");
        if !tasks.is_running(kind) {
            state.update(|s| s.set_pending(kind, PendingOperation::Idle));
        }
    }
}

use alloy_primitives::{Address, U256};

use crate::bridge::NetworkStatus;
use crate::contract::{CoffeeSize, PaymentRecord};

/// The three user-triggered writes. Each has its own pending slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Pay,
    Withdraw,
    Reassign,
}

/// Lifecycle of one write action. `Failed` keeps the message for display and
/// can be re-triggered like `Idle`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PendingOperation {
    #[default]
    Idle,
    Submitting,
    Failed(String),
}

impl PendingOperation {
    pub fn is_submitting(&self) -> bool {
        matches!(self, PendingOperation::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PendingOperation::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Last successfully queried contract state. Fields stay `None`/empty until
/// their first query succeeds and keep their old value when a query fails.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractView {
    pub recipient: Option<Address>,
    /// Wei.
    pub balance: Option<U256>,
    /// Contract order (oldest first).
    pub payments: Vec<PaymentRecord>,
}

/// Which top-level view the page shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Only the connect button.
    Connect,
    /// Coffee form, wallet info, and messages.
    Dashboard,
}

/// Inputs of the buy-a-coffee form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub name: String,
    pub message: String,
    pub size: CoffeeSize,
}

/// All UI-observable state. Every field has exactly one setter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    session: Option<Address>,
    network: NetworkStatus,
    connect_error: Option<String>,
    view: ContractView,
    form: PaymentForm,
    pay: PendingOperation,
    withdraw: PendingOperation,
    reassign: PendingOperation,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<Address> {
        self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Wallet-driven only: connect, restore, or an accounts-changed event.
    pub fn set_session(&mut self, session: Option<Address>) {
        self.session = session;
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_some() {
            Screen::Dashboard
        } else {
            Screen::Connect
        }
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    pub fn set_network(&mut self, network: NetworkStatus) {
        self.network = network;
    }

    pub fn connect_error(&self) -> Option<&str> {
        self.connect_error.as_deref()
    }

    pub fn set_connect_error(&mut self, error: Option<String>) {
        self.connect_error = error;
    }

    pub fn view(&self) -> &ContractView {
        &self.view
    }

    pub fn set_recipient(&mut self, recipient: Address) {
        self.view.recipient = Some(recipient);
    }

    pub fn set_balance(&mut self, balance: U256) {
        self.view.balance = Some(balance);
    }

    pub fn set_payments(&mut self, payments: Vec<PaymentRecord>) {
        self.view.payments = payments;
    }

    pub fn form(&self) -> &PaymentForm {
        &self.form
    }

    pub fn set_name(&mut self, name: String) {
        self.form.name = name;
    }

    pub fn set_message(&mut self, message: String) {
        self.form.message = message;
    }

    pub fn set_size(&mut self, size: CoffeeSize) {
        self.form.size = size;
    }

    pub fn pending(&self, kind: OperationKind) -> &PendingOperation {
        match kind {
            OperationKind::Pay => &self.pay,
            OperationKind::Withdraw => &self.withdraw,
            OperationKind::Reassign => &self.reassign,
        }
    }

    pub fn set_pending(&mut self, kind: OperationKind, op: PendingOperation) {
        let slot = match kind {
            OperationKind::Pay => &mut self.pay,
            OperationKind::Withdraw => &mut self.withdraw,
            OperationKind::Reassign => &mut self.reassign,
        };
        *slot = op;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_fresh_state_is_disconnected_and_idle() {
        let state = AppState::new();
        assert!(!state.is_connected());
        assert_eq!(state.screen(), Screen::Connect);
        assert_eq!(state.network(), &NetworkStatus::Unknown);
        assert_eq!(state.view(), &ContractView::default());
        for kind in [
            OperationKind::Pay,
            OperationKind::Withdraw,
            OperationKind::Reassign,
        ] {
            assert_eq!(state.pending(kind), &PendingOperation::Idle);
        }
    }

    #[test]
    fn test_pending_slots_are_independent() {
        let mut state = AppState::new();
        state.set_pending(OperationKind::Pay, PendingOperation::Submitting);
        state.set_pending(
            OperationKind::Withdraw,
            PendingOperation::Failed("boom".into()),
        );

        assert!(state.pending(OperationKind::Pay).is_submitting());
        assert_eq!(state.pending(OperationKind::Withdraw).error(), Some("boom"));
        assert_eq!(state.pending(OperationKind::Reassign), &PendingOperation::Idle);
    }

    #[test]
    fn test_payments_replace_in_contract_order() {
        let mut state = AppState::new();
        let record = |name: &str, timestamp| PaymentRecord {
            from: address!("1111111111111111111111111111111111111111"),
            name: name.into(),
            message: "hi".into(),
            timestamp,
        };
        state.set_payments(vec![record("stale", 1)]);
        state.set_payments(vec![record("old", 1), record("new", 2)]);
        let names: Vec<_> = state
            .view()
            .payments
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["old", "new"]);
    }
}

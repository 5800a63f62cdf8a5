use std::cell::RefCell;
use std::rc::Rc;

use alloy_primitives::Address;

use coffee_common::actions::{self, StateHandle};
use coffee_common::bridge::Bridge;
use coffee_common::config::BridgeConfig;
use coffee_common::contract::CoffeeSize;
use coffee_common::mock::{MockChain, MockWallet};
use coffee_common::state::{AppState, OperationKind, PendingOperation};
use coffee_common::tasks::TaskRegistry;

use crate::{init_tracing, ALICE, BOB, OWNER};

/// One browser tab: its own wallet, bridge, and UI state, sharing the chain
/// with every other visitor.
pub struct Visitor {
    pub account: Address,
    pub wallet: MockWallet,
    pub bridge: Bridge<MockWallet>,
    pub state: Rc<RefCell<AppState>>,
    pub tasks: TaskRegistry,
}

impl Visitor {
    fn new(chain: &MockChain, config: &BridgeConfig, account: Address) -> Self {
        let wallet = MockWallet::new(chain, vec![account]);
        Self {
            account,
            bridge: Bridge::new(Some(wallet.clone()), config.clone()),
            wallet,
            state: Rc::new(RefCell::new(AppState::new())),
            tasks: TaskRegistry::new(),
        }
    }

    /// Page load: pick up an existing authorization, then query everything.
    pub async fn open_page(&self) {
        actions::restore_session(&self.bridge, &self.state).await;
        actions::refresh_all(&self.bridge, &self.state).await;
    }

    pub async fn connect(&self) {
        actions::connect(&self.bridge, &self.state).await;
    }

    /// Fill in the form and press "Buy".
    pub async fn buy_coffee(&self, name: &str, message: &str, size: CoffeeSize) {
        self.state.update(|s| {
            s.set_name(name.to_string());
            s.set_message(message.to_string());
            s.set_size(size);
        });
        actions::tracked(
            &self.tasks,
            &self.state,
            OperationKind::Pay,
            actions::submit_payment(&self.bridge, &self.state),
        )
        .await;
    }

    pub async fn withdraw(&self) {
        actions::tracked(
            &self.tasks,
            &self.state,
            OperationKind::Withdraw,
            actions::withdraw(&self.bridge, &self.state),
        )
        .await;
    }

    pub async fn set_me_as_recipient(&self) {
        actions::tracked(
            &self.tasks,
            &self.state,
            OperationKind::Reassign,
            actions::reassign_recipient(&self.bridge, &self.state),
        )
        .await;
    }

    pub async fn refresh(&self) {
        actions::refresh_all(&self.bridge, &self.state).await;
    }

    /// The wallet fires `accountsChanged` with `accounts`.
    pub async fn wallet_switches_to(&self, accounts: Vec<Address>) {
        let accounts = self.wallet.set_accounts(accounts);
        actions::accounts_changed(&self.bridge, &self.state, accounts).await;
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read(|s| s.clone())
    }

    pub fn pending(&self, kind: OperationKind) -> PendingOperation {
        self.state.read(|s| s.pending(kind).clone())
    }
}

/// A deployment owned by `OWNER` with two visitors, Alice and Bob.
pub struct TestHarness {
    pub config: BridgeConfig,
    pub chain: MockChain,
    pub alice: Visitor,
    pub bob: Visitor,
}

impl TestHarness {
    pub fn setup() -> Self {
        init_tracing();
        let config = BridgeConfig::default();
        let chain = MockChain::new(&config, OWNER);
        Self {
            alice: Visitor::new(&chain, &config, ALICE),
            bob: Visitor::new(&chain, &config, BOB),
            config,
            chain,
        }
    }
}

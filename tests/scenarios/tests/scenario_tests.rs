use alloy_primitives::U256;
use coffee_common::bridge::NetworkStatus;
use coffee_common::contract::{CoffeeSize, LARGE_COFFEE_WEI, SMALL_COFFEE_WEI};
use coffee_common::rpc;
use coffee_common::state::{OperationKind, PendingOperation, Screen};
use coffee_scenarios::harness::TestHarness;
use coffee_scenarios::{ALICE, BOB, OTHER_CHAIN_ID, OWNER};
use futures::future::join;

/// A visitor who never connected sees only the connect screen, but the page
/// still shows the contract's public state.
#[tokio::test]
async fn never_connected_shows_connect_screen() {
    let h = TestHarness::setup();
    h.chain.push_memo(BOB, "Bob", "first!", SMALL_COFFEE_WEI);

    h.alice.open_page().await;

    let state = h.alice.snapshot();
    assert_eq!(state.screen(), Screen::Connect);
    assert_eq!(state.session(), None);
    assert_eq!(h.alice.wallet.count(rpc::ETH_REQUEST_ACCOUNTS), 0);
    assert_eq!(state.view().recipient, Some(OWNER));
    assert_eq!(state.view().payments.len(), 1);
}

/// Returning visitor: an earlier authorization is picked up without a prompt.
#[tokio::test]
async fn returning_visitor_lands_on_dashboard() {
    let h = TestHarness::setup();
    let _ = h.alice.wallet.clone().authorized();

    h.alice.open_page().await;

    assert_eq!(h.alice.snapshot().screen(), Screen::Dashboard);
    assert_eq!(h.alice.snapshot().session(), Some(ALICE));
    assert_eq!(h.alice.wallet.count(rpc::ETH_REQUEST_ACCOUNTS), 0);
}

/// Connecting on the configured network never asks the wallet to switch.
#[tokio::test]
async fn connect_on_correct_network_does_not_switch() {
    let h = TestHarness::setup();

    h.alice.connect().await;

    let state = h.alice.snapshot();
    assert_eq!(state.screen(), Screen::Dashboard);
    assert_eq!(state.network(), &NetworkStatus::Matched);
    assert_eq!(h.alice.wallet.count(rpc::WALLET_SWITCH_CHAIN), 0);
}

/// Connecting from another network issues exactly one switch request, for
/// the configured chain.
#[tokio::test]
async fn connect_on_wrong_network_requests_one_switch() {
    let h = TestHarness::setup();
    let wallet = h.alice.wallet.clone().on_chain(OTHER_CHAIN_ID);

    h.alice.connect().await;

    let switches: Vec<_> = wallet
        .requests()
        .into_iter()
        .filter(|(method, _)| method == rpc::WALLET_SWITCH_CHAIN)
        .collect();
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].1[0]["chainId"], "0x5");
    assert_eq!(wallet.active_chain_id(), h.config.chain_id);
    assert_eq!(h.alice.snapshot().network(), &NetworkStatus::Matched);
}

/// A declined switch leaves the session up and records the mismatch.
#[tokio::test]
async fn declined_switch_keeps_session_with_mismatch() {
    let h = TestHarness::setup();
    let wallet = h.alice.wallet.clone().on_chain(OTHER_CHAIN_ID);
    wallet.reject_switch(true);

    h.alice.connect().await;

    let state = h.alice.snapshot();
    assert_eq!(state.screen(), Screen::Dashboard);
    assert_eq!(
        state.network(),
        &NetworkStatus::Mismatched {
            active: OTHER_CHAIN_ID,
            required: h.config.chain_id,
        }
    );
    assert_eq!(wallet.count(rpc::WALLET_SWITCH_CHAIN), 1);
}

/// Alice buys a small coffee: one transaction for 0.001 ETH to the contract,
/// and her memo shows up in the list.
#[tokio::test]
async fn small_coffee_sends_fixed_price_and_adds_record() {
    let h = TestHarness::setup();
    h.alice.open_page().await;
    h.alice.connect().await;
    let before = h.alice.snapshot().view().payments.len();

    h.alice.buy_coffee("Alice", "gm", CoffeeSize::Small).await;

    let sent = h.alice.wallet.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, ALICE);
    assert_eq!(sent[0].to, h.config.contract_address);
    assert_eq!(sent[0].value, Some(U256::from(1_000_000_000_000_000u64)));

    let state = h.alice.snapshot();
    assert_eq!(state.view().payments.len(), before + 1);
    let latest = state.view().payments.last().cloned();
    let latest = latest.expect("memo recorded");
    assert_eq!(latest.from, ALICE);
    assert_eq!((latest.name.as_str(), latest.message.as_str()), ("Alice", "gm"));
    assert_eq!(state.view().balance, Some(SMALL_COFFEE_WEI));
    assert_eq!(h.alice.pending(OperationKind::Pay), PendingOperation::Idle);
}

/// The receipt is polled until the transaction is mined; the list refreshes
/// only afterwards.
#[tokio::test]
async fn payment_waits_for_confirmation() {
    let h = TestHarness::setup();
    h.chain.set_polls_before_mined(3);
    h.alice.connect().await;

    h.alice.buy_coffee("Alice", "gm", CoffeeSize::Large).await;

    assert_eq!(h.alice.wallet.count(rpc::ETH_GET_TRANSACTION_RECEIPT), 4);
    assert_eq!(h.alice.wallet.sleeps(), 3);
    assert_eq!(h.alice.snapshot().view().balance, Some(LARGE_COFFEE_WEI));
}

/// A reverted payment surfaces as an error on the pay action and keeps the
/// form so the visitor can retry.
#[tokio::test]
async fn reverted_payment_keeps_form() {
    let h = TestHarness::setup();
    h.alice.connect().await;
    h.chain.revert_next_transaction();

    h.alice.buy_coffee("Alice", "gm", CoffeeSize::Small).await;

    let state = h.alice.snapshot();
    assert!(state.pending(OperationKind::Pay).error().is_some());
    assert_eq!(state.form().name, "Alice");
    assert_eq!(state.form().message, "gm");
    assert!(h.chain.memos().is_empty());
}

/// The wallet disconnecting mid-payment clears the session at once; the
/// payment itself runs to completion.
#[tokio::test]
async fn disconnect_during_payment_clears_session_only() {
    let h = TestHarness::setup();
    h.chain.set_polls_before_mined(2);
    h.alice.connect().await;

    join(
        h.alice.buy_coffee("Alice", "gm", CoffeeSize::Small),
        async {
            assert!(h.alice.pending(OperationKind::Pay).is_submitting());
            h.alice.wallet_switches_to(vec![]).await;
            assert_eq!(h.alice.snapshot().screen(), Screen::Connect);
        },
    )
    .await;

    let state = h.alice.snapshot();
    assert_eq!(state.session(), None);
    assert_eq!(state.network(), &NetworkStatus::Unknown);
    assert_eq!(state.pending(OperationKind::Pay), &PendingOperation::Idle);
    assert_eq!(h.chain.memos().len(), 1);
}

/// Bob's payment only appears in Alice's list once she refreshes.
#[tokio::test]
async fn other_sessions_payment_appears_after_refresh() {
    let h = TestHarness::setup();
    h.alice.open_page().await;
    h.alice.connect().await;
    h.bob.connect().await;

    h.bob.buy_coffee("Bob", "hello from bob", CoffeeSize::Large).await;
    assert!(h.alice.snapshot().view().payments.is_empty());

    h.alice.refresh().await;
    let state = h.alice.snapshot();
    assert_eq!(state.view().payments.len(), 1);
    assert_eq!(state.view().payments[0].from, BOB);
    assert_eq!(state.view().balance, Some(LARGE_COFFEE_WEI));
}

/// Taking over as recipient pays the accumulated balance to the old
/// recipient first.
#[tokio::test]
async fn reassign_flushes_balance_to_previous_recipient() {
    let h = TestHarness::setup();
    h.alice.connect().await;
    h.bob.connect().await;
    h.alice.buy_coffee("Alice", "gm", CoffeeSize::Small).await;
    h.alice.buy_coffee("Alice", "again", CoffeeSize::Large).await;

    h.bob.set_me_as_recipient().await;

    assert_eq!(h.chain.recipient(), BOB);
    assert_eq!(h.chain.paid_out(OWNER), SMALL_COFFEE_WEI + LARGE_COFFEE_WEI);
    assert_eq!(h.chain.balance(), U256::ZERO);
    let state = h.bob.snapshot();
    assert_eq!(state.view().recipient, Some(BOB));
    assert_eq!(state.view().balance, Some(U256::ZERO));

    h.alice.buy_coffee("Alice", "third", CoffeeSize::Small).await;
    h.alice.withdraw().await;
    assert_eq!(h.chain.paid_out(BOB), SMALL_COFFEE_WEI);

    // Memos are listed in the order the contract stored them.
    let messages: Vec<_> = h
        .alice
        .snapshot()
        .view()
        .payments
        .iter()
        .map(|p| p.message.clone())
        .collect();
    assert_eq!(messages, ["gm", "again", "third"]);
}

/// Switching to another account in the wallet moves the session over.
#[tokio::test]
async fn account_switch_follows_wallet() {
    let h = TestHarness::setup();
    h.alice.connect().await;

    h.alice.wallet_switches_to(vec![BOB, ALICE]).await;

    assert_eq!(h.alice.snapshot().session(), Some(BOB));
    h.alice.buy_coffee("Bob", "via alice's tab", CoffeeSize::Small).await;
    assert_eq!(h.chain.memos()[0].from, BOB);
}

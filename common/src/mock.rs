//! Scripted wallet and in-memory `BuyMeACoffee` contract.
//!
//! No chain involved: transactions execute instantly against `MockChain` and
//! their receipts appear after a configurable number of polls. Several
//! `MockWallet`s can share one chain to model independent browser sessions.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::task::Poll;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall;
use serde_json::{json, Value};

use crate::config::BridgeConfig;
use crate::contract::{
    buyCoffeeCall, memosCall, recipientCall, setMyselfAsRecipientCall, withdrawCall, Memo,
    PaymentRecord,
};
use crate::provider::{
    ProviderError, WalletProvider, DISCONNECTED, INTERNAL_ERROR, UNAUTHORIZED,
    UNRECOGNIZED_CHAIN, UNSUPPORTED_METHOD, USER_REJECTED,
};
use crate::rpc::{self, CallRequest, TransactionReceipt, TransactionRequest};

/// Block timestamp of the first simulated block.
pub const GENESIS_TIMESTAMP: u64 = 1_658_685_791;
const BLOCK_TIME_SECS: u64 = 12;

struct PendingReceipt {
    receipt: TransactionReceipt,
    polls_left: u32,
}

struct ChainState {
    chain_id: u64,
    contract: Address,
    recipient: Address,
    balance: U256,
    memos: Vec<PaymentRecord>,
    payouts: HashMap<Address, U256>,
    block_number: u64,
    timestamp: u64,
    receipts: HashMap<B256, PendingReceipt>,
    polls_before_mined: u32,
    revert_next: bool,
    broken_calls: HashSet<[u8; 4]>,
}

/// In-memory chain hosting a single `BuyMeACoffee` deployment.
#[derive(Clone)]
pub struct MockChain {
    inner: Rc<RefCell<ChainState>>,
}

impl MockChain {
    pub fn new(config: &BridgeConfig, recipient: Address) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChainState {
                chain_id: config.chain_id,
                contract: config.contract_address,
                recipient,
                balance: U256::ZERO,
                memos: Vec::new(),
                payouts: HashMap::new(),
                block_number: 1,
                timestamp: GENESIS_TIMESTAMP,
                receipts: HashMap::new(),
                polls_before_mined: 0,
                revert_next: false,
                broken_calls: HashSet::new(),
            })),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.inner.borrow().chain_id
    }

    pub fn recipient(&self) -> Address {
        self.inner.borrow().recipient
    }

    /// Wei held by the contract.
    pub fn balance(&self) -> U256 {
        self.inner.borrow().balance
    }

    pub fn memos(&self) -> Vec<PaymentRecord> {
        self.inner.borrow().memos.clone()
    }

    /// Total withdrawn to `account` so far.
    pub fn paid_out(&self, account: Address) -> U256 {
        self.inner
            .borrow()
            .payouts
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    /// Number of `null` receipt polls before each transaction is mined.
    pub fn set_polls_before_mined(&self, polls: u32) {
        self.inner.borrow_mut().polls_before_mined = polls;
    }

    /// Mine the next transaction with `status = 0` and no state change.
    pub fn revert_next_transaction(&self) {
        self.inner.borrow_mut().revert_next = true;
    }

    /// Make `eth_call` fail for one contract function.
    pub fn break_call(&self, selector: [u8; 4]) {
        self.inner.borrow_mut().broken_calls.insert(selector);
    }

    /// Seed a memo without going through a wallet.
    pub fn push_memo(&self, from: Address, name: &str, message: &str, value: U256) {
        let mut chain = self.inner.borrow_mut();
        let timestamp = chain.timestamp;
        chain.memos.push(PaymentRecord {
            from,
            name: name.to_string(),
            message: message.to_string(),
            timestamp,
        });
        chain.balance += value;
        chain.advance();
    }

    fn call(&self, to: Address, data: &[u8]) -> Result<Bytes, ProviderError> {
        let chain = self.inner.borrow();
        if to != chain.contract {
            return Ok(Bytes::new());
        }
        let selector = selector_of(data)?;
        if chain.broken_calls.contains(&selector) {
            return Err(ProviderError::new(INTERNAL_ERROR, "header not found"));
        }
        let encoded = if selector == recipientCall::SELECTOR {
            recipientCall::abi_encode_returns(&(chain.recipient,))
        } else if selector == memosCall::SELECTOR {
            let memos: Vec<Memo> = chain.memos.iter().map(Memo::from).collect();
            memosCall::abi_encode_returns(&(memos,))
        } else {
            return Err(ProviderError::new(INTERNAL_ERROR, "execution reverted"));
        };
        Ok(Bytes::from(encoded))
    }

    fn balance_of(&self, account: Address) -> U256 {
        let chain = self.inner.borrow();
        if account == chain.contract {
            chain.balance
        } else {
            chain.payouts.get(&account).copied().unwrap_or_default()
        }
    }

    /// Execute a transaction and queue its receipt. Reverts detected up front
    /// (as during gas estimation) are returned as errors and nothing is mined.
    fn submit(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        let mut chain = self.inner.borrow_mut();
        let value = tx.value.unwrap_or_default();
        let status = if std::mem::take(&mut chain.revert_next) {
            false
        } else {
            if tx.to == chain.contract {
                chain.execute(tx.from, &tx.data, value)?;
            }
            true
        };

        let hash = B256::from(rand::random::<[u8; 32]>());
        let receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(chain.block_number)),
            status: Some(U64::from(u8::from(status))),
        };
        let polls_left = chain.polls_before_mined;
        chain.receipts.insert(
            hash,
            PendingReceipt {
                receipt,
                polls_left,
            },
        );
        chain.advance();
        Ok(hash)
    }

    fn poll_receipt(&self, hash: B256) -> Value {
        let mut chain = self.inner.borrow_mut();
        match chain.receipts.get_mut(&hash) {
            Some(pending) if pending.polls_left > 0 => {
                pending.polls_left -= 1;
                Value::Null
            }
            Some(pending) => json!(pending.receipt),
            None => Value::Null,
        }
    }
}

impl ChainState {
    fn advance(&mut self) {
        self.block_number += 1;
        self.timestamp += BLOCK_TIME_SECS;
    }

    fn flush_to_recipient(&mut self) {
        let amount = std::mem::take(&mut self.balance);
        *self.payouts.entry(self.recipient).or_default() += amount;
    }

    fn execute(&mut self, from: Address, data: &[u8], value: U256) -> Result<(), ProviderError> {
        let selector = selector_of(data)?;
        if selector == buyCoffeeCall::SELECTOR {
            let call = buyCoffeeCall::abi_decode(data, true).map_err(revert)?;
            if value.is_zero() {
                return Err(revert("can't buy coffee for free!"));
            }
            self.memos.push(PaymentRecord {
                from,
                name: call.name,
                message: call.message,
                timestamp: self.timestamp,
            });
            self.balance += value;
        } else if selector == withdrawCall::SELECTOR {
            if self.balance.is_zero() {
                return Err(revert("nothing to withdraw"));
            }
            self.flush_to_recipient();
        } else if selector == setMyselfAsRecipientCall::SELECTOR {
            self.flush_to_recipient();
            self.recipient = from;
        } else {
            return Err(revert("unknown function"));
        }
        Ok(())
    }
}

fn revert(reason: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(INTERNAL_ERROR, format!("execution reverted: {reason}"))
}

fn selector_of(data: &[u8]) -> Result<[u8; 4], ProviderError> {
    data.get(..4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or_else(|| revert("missing selector"))
}

struct WalletState {
    accounts: Vec<Address>,
    authorized: bool,
    chain_id: u64,
    reject_connect: bool,
    reject_switch: bool,
    reject_transactions: bool,
    failing_methods: HashSet<String>,
    requests: Vec<(String, Value)>,
    sleeps: u32,
}

/// Browser wallet scripted by the test: which accounts it holds, whether the
/// user approves prompts, and which chain it is pointed at.
#[derive(Clone)]
pub struct MockWallet {
    chain: MockChain,
    inner: Rc<RefCell<WalletState>>,
}

impl MockWallet {
    /// A wallet holding `accounts`, on the chain's network, not yet authorized.
    pub fn new(chain: &MockChain, accounts: Vec<Address>) -> Self {
        let chain_id = chain.chain_id();
        Self {
            chain: chain.clone(),
            inner: Rc::new(RefCell::new(WalletState {
                accounts,
                authorized: false,
                chain_id,
                reject_connect: false,
                reject_switch: false,
                reject_transactions: false,
                failing_methods: HashSet::new(),
                requests: Vec::new(),
                sleeps: 0,
            })),
        }
    }

    /// Treat the site as already authorized (as after an earlier visit).
    pub fn authorized(self) -> Self {
        self.inner.borrow_mut().authorized = true;
        self
    }

    pub fn on_chain(self, chain_id: u64) -> Self {
        self.inner.borrow_mut().chain_id = chain_id;
        self
    }

    pub fn chain(&self) -> &MockChain {
        &self.chain
    }

    pub fn active_chain_id(&self) -> u64 {
        self.inner.borrow().chain_id
    }

    /// Replace the accounts the wallet exposes. An empty list models a lock
    /// or a disconnect; pass the result to `actions::accounts_changed`.
    pub fn set_accounts(&self, accounts: Vec<Address>) -> Vec<Address> {
        let mut wallet = self.inner.borrow_mut();
        wallet.accounts = accounts.clone();
        wallet.authorized = !accounts.is_empty();
        accounts
    }

    pub fn reject_connect(&self, reject: bool) {
        self.inner.borrow_mut().reject_connect = reject;
    }

    pub fn reject_switch(&self, reject: bool) {
        self.inner.borrow_mut().reject_switch = reject;
    }

    pub fn reject_transactions(&self, reject: bool) {
        self.inner.borrow_mut().reject_transactions = reject;
    }

    /// Make every request for `method` fail as if the provider were disconnected.
    pub fn fail_method(&self, method: &str) {
        self.inner
            .borrow_mut()
            .failing_methods
            .insert(method.to_string());
    }

    pub fn restore_method(&self, method: &str) {
        self.inner.borrow_mut().failing_methods.remove(method);
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.inner.borrow().requests.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.inner
            .borrow()
            .requests
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn clear_requests(&self) {
        self.inner.borrow_mut().requests.clear();
    }

    /// Transactions the wallet was asked to sign, in order.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.inner
            .borrow()
            .requests
            .iter()
            .filter(|(m, _)| m == rpc::ETH_SEND_TRANSACTION)
            .filter_map(|(_, params)| rpc::decode(params[0].clone()).ok())
            .collect()
    }

    pub fn sleeps(&self) -> u32 {
        self.inner.borrow().sleeps
    }

    fn dispatch(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let (authorized, chain_matches) = {
            let wallet = self.inner.borrow();
            if wallet.failing_methods.contains(method) {
                return Err(ProviderError::new(
                    DISCONNECTED,
                    format!("{method}: provider disconnected"),
                ));
            }
            (wallet.authorized, wallet.chain_id == self.chain.chain_id())
        };

        match method {
            rpc::ETH_ACCOUNTS => {
                let wallet = self.inner.borrow();
                let accounts: &[Address] = if wallet.authorized {
                    &wallet.accounts
                } else {
                    &[]
                };
                Ok(json!(accounts))
            }
            rpc::ETH_REQUEST_ACCOUNTS => {
                let mut wallet = self.inner.borrow_mut();
                if wallet.reject_connect {
                    return Err(ProviderError::user_rejected());
                }
                wallet.authorized = true;
                Ok(json!(wallet.accounts))
            }
            rpc::ETH_CHAIN_ID => Ok(json!(U64::from(self.active_chain_id()))),
            rpc::WALLET_SWITCH_CHAIN => {
                let mut wallet = self.inner.borrow_mut();
                if wallet.reject_switch {
                    return Err(ProviderError::new(
                        UNRECOGNIZED_CHAIN,
                        "Unrecognized chain ID. Try adding the chain using wallet_addEthereumChain first.",
                    ));
                }
                let chain_id: U64 = rpc::decode(params[0]["chainId"].clone())
                    .map_err(|e| ProviderError::new(INTERNAL_ERROR, e))?;
                wallet.chain_id = chain_id.to();
                Ok(Value::Null)
            }
            rpc::ETH_CALL => {
                if !chain_matches {
                    // Nothing deployed at that address on this network.
                    return Ok(json!("0x"));
                }
                let call: CallRequest = rpc::decode(params[0].clone())
                    .map_err(|e| ProviderError::new(INTERNAL_ERROR, e))?;
                let out = self.chain.call(call.to, &call.data)?;
                Ok(json!(out))
            }
            rpc::ETH_GET_BALANCE => {
                let account: Address = rpc::decode(params[0].clone())
                    .map_err(|e| ProviderError::new(INTERNAL_ERROR, e))?;
                let balance = if chain_matches {
                    self.chain.balance_of(account)
                } else {
                    U256::ZERO
                };
                Ok(json!(balance))
            }
            rpc::ETH_SEND_TRANSACTION => {
                let wallet = self.inner.borrow();
                if wallet.reject_transactions {
                    return Err(ProviderError::new(
                        USER_REJECTED,
                        "MetaMask Tx Signature: User denied transaction signature.",
                    ));
                }
                let tx: TransactionRequest = rpc::decode(params[0].clone())
                    .map_err(|e| ProviderError::new(INTERNAL_ERROR, e))?;
                if !authorized || !wallet.accounts.contains(&tx.from) {
                    return Err(ProviderError::new(
                        UNAUTHORIZED,
                        "The requested account has not been authorized by the user.",
                    ));
                }
                drop(wallet);
                let hash = if chain_matches {
                    self.chain.submit(&tx)?
                } else {
                    // Wrong network: the call lands on an empty address and
                    // simply succeeds without touching the contract.
                    B256::from(rand::random::<[u8; 32]>())
                };
                Ok(json!(hash.to_string()))
            }
            rpc::ETH_GET_TRANSACTION_RECEIPT => {
                let hash: B256 = rpc::decode(params[0].clone())
                    .map_err(|e| ProviderError::new(INTERNAL_ERROR, e))?;
                if chain_matches {
                    Ok(self.chain.poll_receipt(hash))
                } else {
                    Ok(json!(TransactionReceipt {
                        transaction_hash: hash,
                        block_number: None,
                        status: Some(U64::from(1)),
                    }))
                }
            }
            other => Err(ProviderError::new(
                UNSUPPORTED_METHOD,
                format!("{other} is not supported"),
            )),
        }
    }
}

impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.inner
            .borrow_mut()
            .requests
            .push((method.to_string(), params.clone()));
        self.dispatch(method, &params)
    }

    /// Counts the wait and yields once, so a concurrent task gets to run
    /// between receipt polls.
    async fn sleep(&self, _millis: u64) {
        self.inner.borrow_mut().sleeps += 1;
        let mut yielded = false;
        futures::future::poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await;
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

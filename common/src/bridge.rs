//! Wallet-contract bridge.
//!
//! Translates UI intents into wallet requests against the fixed
//! `BuyMeACoffee` deployment. Reads go through `eth_call`/`eth_getBalance`;
//! writes are signed by the wallet via `eth_sendTransaction` and awaited by
//! polling for the receipt. Nothing here retries.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall;
use serde_json::json;

use crate::config::BridgeConfig;
use crate::contract::{
    buyCoffeeCall, memosCall, recipientCall, setMyselfAsRecipientCall, withdrawCall, CoffeeSize,
    PaymentRecord,
};
use crate::error::BridgeError;
use crate::provider::WalletProvider;
use crate::rpc::{self, TransactionReceipt, TransactionRequest};

/// Outcome of the last network-assurance check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NetworkStatus {
    #[default]
    Unknown,
    Matched,
    /// The wallet stayed on `active` after a switch to `required` was refused.
    Mismatched { active: u64, required: u64 },
}

/// Reject a payment whose name or message is empty.
pub fn validate_payment(name: &str, message: &str) -> Result<(), BridgeError> {
    if name.is_empty() {
        return Err(BridgeError::Validation("Please enter your name".into()));
    }
    if message.is_empty() {
        return Err(BridgeError::Validation("Please enter your message".into()));
    }
    Ok(())
}

fn require_session(from: Option<Address>) -> Result<Address, BridgeError> {
    from.ok_or_else(|| BridgeError::Validation("Connect a wallet first".into()))
}

/// Holds the injected wallet (if the browser has one) and the deployment config.
#[derive(Clone)]
pub struct Bridge<P> {
    provider: Option<P>,
    config: BridgeConfig,
}

impl<P: WalletProvider> Bridge<P> {
    pub fn new(provider: Option<P>, config: BridgeConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    fn require_provider(&self) -> Result<&P, BridgeError> {
        self.provider.as_ref().ok_or(BridgeError::NoProvider)
    }

    // ─── Accounts & network ────────────────────────────────────────────────

    /// Prompt the wallet for account access and return the first account.
    pub async fn connect(&self) -> Result<Address, BridgeError> {
        let accounts = self.accounts(rpc::ETH_REQUEST_ACCOUNTS).await?;
        accounts
            .first()
            .copied()
            .ok_or_else(|| BridgeError::Query("No address found".into()))
    }

    /// The first account this site is already authorized for, without prompting.
    pub async fn authorized_account(&self) -> Result<Option<Address>, BridgeError> {
        Ok(self.accounts(rpc::ETH_ACCOUNTS).await?.first().copied())
    }

    async fn accounts(&self, method: &str) -> Result<Vec<Address>, BridgeError> {
        let provider = self.require_provider()?;
        let value = provider
            .request(method, json!([]))
            .await
            .map_err(BridgeError::from_query)?;
        rpc::decode(value).map_err(BridgeError::Query)
    }

    /// Ask the wallet to switch to the contract's chain if it is elsewhere.
    ///
    /// Best effort: failures are logged and reported as a status, never as an
    /// error, and later calls are not blocked.
    pub async fn ensure_network(&self) -> NetworkStatus {
        let required = self.config.chain_id;
        let Some(provider) = self.provider.as_ref() else {
            tracing::warn!("No wallet provider; skipping network check");
            return NetworkStatus::Unknown;
        };

        let active = match provider.request(rpc::ETH_CHAIN_ID, json!([])).await {
            Ok(value) => match rpc::decode::<U64>(value) {
                Ok(id) => id.to::<u64>(),
                Err(e) => {
                    tracing::warn!("Unreadable chain id from wallet: {e}");
                    return NetworkStatus::Unknown;
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read active chain: {e}");
                return NetworkStatus::Unknown;
            }
        };
        tracing::debug!("chainId: {active}");

        if active == required {
            return NetworkStatus::Matched;
        }

        let params = json!([{ "chainId": self.config.chain_id_hex() }]);
        match provider.request(rpc::WALLET_SWITCH_CHAIN, params).await {
            Ok(_) => {
                tracing::info!("Switched wallet from chain {active} to {required}");
                NetworkStatus::Matched
            }
            Err(e) => {
                tracing::warn!("Switch to chain {required} failed: {e}");
                NetworkStatus::Mismatched { active, required }
            }
        }
    }

    // ─── Writes ────────────────────────────────────────────────────────────

    /// Buy a coffee: one `buyCoffee(name, message)` transaction carrying the
    /// size's fixed price. Inputs are checked before the wallet is touched.
    pub async fn submit_payment(
        &self,
        from: Option<Address>,
        name: &str,
        message: &str,
        size: CoffeeSize,
    ) -> Result<TransactionReceipt, BridgeError> {
        validate_payment(name, message)?;
        let from = require_session(from)?;
        let data = buyCoffeeCall {
            name: name.to_string(),
            message: message.to_string(),
        }
        .abi_encode();
        self.send_and_confirm(from, data, Some(size.price_wei()))
            .await
    }

    /// Send the whole balance to the current recipient. Anyone may call it.
    pub async fn withdraw(&self, from: Option<Address>) -> Result<TransactionReceipt, BridgeError> {
        let from = require_session(from)?;
        self.send_and_confirm(from, withdrawCall {}.abi_encode(), None)
            .await
    }

    /// Flush the balance to the current recipient, then make the caller the
    /// recipient.
    pub async fn reassign_recipient_to_self(
        &self,
        from: Option<Address>,
    ) -> Result<TransactionReceipt, BridgeError> {
        let from = require_session(from)?;
        self.send_and_confirm(from, setMyselfAsRecipientCall {}.abi_encode(), None)
            .await
    }

    async fn send_and_confirm(
        &self,
        from: Address,
        data: Vec<u8>,
        value: Option<U256>,
    ) -> Result<TransactionReceipt, BridgeError> {
        let provider = self.require_provider()?;
        let tx = TransactionRequest {
            from,
            to: self.config.contract_address,
            data: Bytes::from(data),
            value,
        };

        let hash = provider
            .request(rpc::ETH_SEND_TRANSACTION, rpc::send_params(&tx))
            .await
            .map_err(BridgeError::from_send)?;
        let hash: B256 = rpc::decode(hash).map_err(BridgeError::Transaction)?;
        tracing::info!("Submitted transaction {hash}");

        let receipt = loop {
            let value = provider
                .request(rpc::ETH_GET_TRANSACTION_RECEIPT, json!([hash.to_string()]))
                .await
                .map_err(BridgeError::from_send)?;
            if let Some(receipt) = rpc::decode_receipt(value).map_err(BridgeError::Transaction)? {
                break receipt;
            }
            provider.sleep(self.config.receipt_poll_ms).await;
        };

        if !receipt.succeeded() {
            tracing::warn!("Transaction {hash} reverted");
            return Err(BridgeError::Transaction(format!(
                "transaction {hash} reverted"
            )));
        }
        tracing::info!(
            "Transaction {hash} confirmed in block {:?}",
            receipt.block_number
        );
        Ok(receipt)
    }

    // ─── Reads ─────────────────────────────────────────────────────────────

    pub async fn query_recipient(&self) -> Result<Address, BridgeError> {
        let out = self.call(recipientCall {}.abi_encode()).await?;
        recipientCall::abi_decode_returns(&out, true)
            .map(|ret| ret._0)
            .map_err(|e| BridgeError::Query(format!("recipient(): {e}")))
    }

    /// Contract balance in wei.
    pub async fn query_balance(&self) -> Result<U256, BridgeError> {
        let provider = self.require_provider()?;
        let params = json!([self.config.contract_address.to_string(), "latest"]);
        let value = provider
            .request(rpc::ETH_GET_BALANCE, params)
            .await
            .map_err(BridgeError::from_query)?;
        rpc::decode(value).map_err(BridgeError::Query)
    }

    /// All memos, in the order the contract stored them.
    pub async fn query_payments(&self) -> Result<Vec<PaymentRecord>, BridgeError> {
        let out = self.call(memosCall {}.abi_encode()).await?;
        memosCall::abi_decode_returns(&out, true)
            .map(|ret| ret._0.into_iter().map(PaymentRecord::from).collect())
            .map_err(|e| BridgeError::Query(format!("memos(): {e}")))
    }

    async fn call(&self, data: Vec<u8>) -> Result<Bytes, BridgeError> {
        let provider = self.require_provider()?;
        let value = provider
            .request(
                rpc::ETH_CALL,
                rpc::call_params(self.config.contract_address, Bytes::from(data)),
            )
            .await
            .map_err(BridgeError::from_query)?;
        rpc::decode(value).map_err(BridgeError::Query)
    }
}

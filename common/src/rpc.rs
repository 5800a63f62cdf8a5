//! JSON-RPC wire types for the handful of wallet methods the bridge uses.
//!
//! Quantities travel as `0x`-prefixed hex strings and data as `0x`-prefixed
//! hex bytes; alloy's serde impls produce and accept exactly that.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const WALLET_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const ETH_CALL: &str = "eth_call";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";

/// A value-carrying contract call to be signed by the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

/// Read-only call object for `eth_call`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}

/// The parts of a transaction receipt the bridge cares about. Other fields
/// the wallet returns are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` revert. Absent on pre-Byzantium receipts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |status| status == U64::from(1))
    }
}

/// `[tx]` for `eth_sendTransaction`.
pub fn send_params(tx: &TransactionRequest) -> Value {
    json!([tx])
}

/// `[{ to, data }, "latest"]` for `eth_call`.
pub fn call_params(to: Address, data: Bytes) -> Value {
    json!([CallRequest { to, data }, "latest"])
}

/// Decode a wallet result into its wire type.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("unexpected response: {e}"))
}

/// Receipt poll result. `null` until the transaction is mined.
pub fn decode_receipt(value: Value) -> Result<Option<TransactionReceipt>, String> {
    decode(value)
}

use alloy_primitives::{address, Address};

/// Deployed `BuyMeACoffee` contract.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("04d91921a713ca3b82075a46807e99e168815e21");

/// Goerli.
pub const DEFAULT_CHAIN_ID: u64 = 5;

/// Delay between `eth_getTransactionReceipt` polls while waiting for confirmation.
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_500;

/// Fixed deployment the bridge talks to.
///
/// Built from compile-time env vars (`COFFEE_CONTRACT_ADDRESS`, `COFFEE_CHAIN_ID`,
/// `COFFEE_RECEIPT_POLL_MS`); anything unset or unparsable falls back to the
/// default deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    pub contract_address: Address,
    pub chain_id: u64,
    pub receipt_poll_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            chain_id: DEFAULT_CHAIN_ID,
            receipt_poll_ms: DEFAULT_RECEIPT_POLL_MS,
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("COFFEE_CONTRACT_ADDRESS"),
            option_env!("COFFEE_CHAIN_ID"),
            option_env!("COFFEE_RECEIPT_POLL_MS"),
        )
    }

    fn from_values(address: Option<&str>, chain_id: Option<&str>, poll_ms: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = address.filter(|s| !s.is_empty()) {
            match raw.parse::<Address>() {
                Ok(addr) => config.contract_address = addr,
                Err(e) => tracing::warn!("Ignoring COFFEE_CONTRACT_ADDRESS={raw}: {e}"),
            }
        }
        if let Some(raw) = chain_id.filter(|s| !s.is_empty()) {
            match parse_chain_id(raw) {
                Some(id) => config.chain_id = id,
                None => tracing::warn!("Ignoring COFFEE_CHAIN_ID={raw}"),
            }
        }
        if let Some(raw) = poll_ms.filter(|s| !s.is_empty()) {
            match raw.parse::<u64>() {
                Ok(ms) => config.receipt_poll_ms = ms,
                Err(e) => tracing::warn!("Ignoring COFFEE_RECEIPT_POLL_MS={raw}: {e}"),
            }
        }

        config
    }

    /// Chain id in the `0x`-prefixed form `wallet_switchEthereumChain` expects.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

/// Accepts both decimal ("5") and hex ("0x5") chain ids.
fn parse_chain_id(raw: &str) -> Option<u64> {
    match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

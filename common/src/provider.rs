use serde::Deserialize;
use serde_json::Value;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193: the account has not been authorized by the user.
pub const UNAUTHORIZED: i64 = 4100;
/// EIP-1193: the requested method is not supported.
pub const UNSUPPORTED_METHOD: i64 = 4200;
/// EIP-1193: the provider is disconnected from all chains.
pub const DISCONNECTED: i64 = 4900;
/// EIP-3326: the wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// JSON-RPC internal error (reverts during gas estimation surface here).
pub const INTERNAL_ERROR: i64 = -32603;

/// Error object returned by a wallet `request` (EIP-1193 `ProviderRpcError`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProviderError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED, "User rejected the request.")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderError {}

/// An injected wallet (MetaMask and friends).
///
/// Passed explicitly to the bridge so tests can swap in a scripted wallet.
/// Account-change notifications are not part of the trait: the browser
/// binding forwards them to `actions::accounts_changed`.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// `provider.request({ method, params })`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Suspend between receipt polls.
    async fn sleep(&self, millis: u64);

    /// Human-readable provider name (e.g. "MetaMask", "mock").
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_object_from_wallet() {
        let err: ProviderError = serde_json::from_value(json!({
            "code": 4001,
            "message": "User rejected the request.",
            "stack": "Error: at ...",
        }))
        .unwrap();
        assert!(err.is_user_rejection());
        assert_eq!(err, ProviderError::user_rejected());
    }

    #[test]
    fn test_error_object_without_message() {
        let err: ProviderError = serde_json::from_value(json!({ "code": 4900 })).unwrap();
        assert_eq!(err, ProviderError::new(DISCONNECTED, ""));
        assert!(serde_json::from_value::<ProviderError>(json!({ "message": "boom" })).is_err());
    }
}

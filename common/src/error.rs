use thiserror::Error;

use crate::provider::ProviderError;

/// Everything a bridge call can fail with. Each action renders its own
/// error's `Display` next to its trigger; none of these are fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("no wallet found, please install MetaMask")]
    NoProvider,
    #[error("request rejected in wallet")]
    UserRejected,
    /// Caught before any network call.
    #[error("{0}")]
    Validation(String),
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("query failed: {0}")]
    Query(String),
}

impl BridgeError {
    /// Convert a wallet error raised while submitting a transaction.
    pub fn from_send(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::UserRejected
        } else {
            Self::Transaction(err.message)
        }
    }

    /// Convert a wallet error raised by a read call or account lookup.
    pub fn from_query(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::UserRejected
        } else {
            Self::Query(err.message)
        }
    }
}

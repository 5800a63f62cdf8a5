pub mod actions;
pub mod bridge;
pub mod config;
pub mod contract;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod state;
pub mod tasks;

#[cfg(any(test, feature = "dev"))]
pub mod mock;

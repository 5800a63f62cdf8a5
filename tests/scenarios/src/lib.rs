use alloy_primitives::{address, Address};

pub mod harness;

/// Account that owns the deployment and is the initial recipient.
pub const OWNER: Address = address!("0000000000000000000000000000000000000abc");
pub const ALICE: Address = address!("a11ce00000000000000000000000000000000001");
pub const BOB: Address = address!("b0b0000000000000000000000000000000000002");
/// Sepolia, used as the "wrong network" in scenarios.
pub const OTHER_CHAIN_ID: u64 = 11_155_111;

/// Route `tracing` output through the test harness's captured stdout.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

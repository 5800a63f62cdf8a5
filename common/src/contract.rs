//! `BuyMeACoffee` contract interface and the client-side views of its data.

use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, U256};
use chrono::{DateTime, TimeZone};

alloy_sol_types::sol! {
    struct Memo {
        address from;
        uint256 timestamp;
        string name;
        string message;
    }

    function buyCoffee(string name, string message) external payable;
    function withdraw() external;
    function setMyselfAsRecipient() external;
    function recipient() external view returns (address);
    function memos() external view returns (Memo[] memory);
}

/// 0.001 ether.
pub const SMALL_COFFEE_WEI: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);
/// 0.003 ether.
pub const LARGE_COFFEE_WEI: U256 = U256::from_limbs([3_000_000_000_000_000, 0, 0, 0]);

/// Price tier selected in the UI. Each size maps to one fixed amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CoffeeSize {
    #[default]
    Small,
    Large,
}

impl CoffeeSize {
    pub fn all() -> &'static [CoffeeSize] {
        &[CoffeeSize::Small, CoffeeSize::Large]
    }

    pub fn price_wei(self) -> U256 {
        match self {
            CoffeeSize::Small => SMALL_COFFEE_WEI,
            CoffeeSize::Large => LARGE_COFFEE_WEI,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoffeeSize::Small => "Small",
            CoffeeSize::Large => "Large",
        }
    }
}

/// A memo left by a paying visitor. Owned by the contract; never edited here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRecord {
    pub from: Address,
    pub name: String,
    pub message: String,
    /// Seconds since the Unix epoch (block timestamp).
    pub timestamp: u64,
}

impl From<Memo> for PaymentRecord {
    fn from(memo: Memo) -> Self {
        Self {
            from: memo.from,
            name: memo.name,
            message: memo.message,
            timestamp: u64::try_from(memo.timestamp).unwrap_or(u64::MAX),
        }
    }
}

impl From<&PaymentRecord> for Memo {
    fn from(record: &PaymentRecord) -> Self {
        Memo {
            from: record.from,
            timestamp: U256::from(record.timestamp),
            name: record.name.clone(),
            message: record.message.clone(),
        }
    }
}

impl PaymentRecord {
    /// Local date and time of the payment, e.g. "2022-07-24 18:03:11".
    #[cfg(feature = "std")]
    pub fn local_time(&self) -> String {
        format_timestamp(self.timestamp, &chrono::Local)
    }
}

pub fn format_timestamp<Tz: TimeZone>(secs: u64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Render a wei amount in ether, trimming trailing zeros ("0.001", "1.5", "0.0").
pub fn format_ether(wei: U256) -> String {
    let Ok(ether) = format_units(wei, "ether") else {
        return wei.to_string();
    };
    let trimmed = ether.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

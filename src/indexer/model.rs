//! Indexed entities
//!
//! Entity ids are lowercase hex strings (addresses, `"<txhash>-<logIndex>"`
//! for events) so snapshots read the same as a GraphQL query result.

use alloy_primitives::{Address, B256, I256, U256};
use serde::Serialize;

/// Id of the single [`GlobalStat`] entity.
pub const GLOBAL_STAT_ID: &str = "global";

/// Lowercase hex id of an account.
pub fn user_id(address: Address) -> String {
    format!("{address:#x}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Locks minus unlocks seen so far. Negative when the indexed window
    /// starts after earlier locks.
    pub total_locked: I256,
}

impl User {
    pub fn new(address: Address) -> Self {
        Self {
            id: user_id(address),
            total_locked: I256::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStat {
    pub id: String,
    pub total_locked: I256,
    pub user_count: u64,
}

impl Default for GlobalStat {
    fn default() -> Self {
        Self {
            id: GLOBAL_STAT_ID.to_string(),
            total_locked: I256::ZERO,
            user_count: 0,
        }
    }
}

/// A `Lock` or `Unlock` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEvent {
    pub id: String,
    pub user: String,
    pub amount: U256,
    pub block_number: U256,
    pub timestamp: u64,
    pub transaction_hash: B256,
}

pub type UnlockEvent = LockEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OftSentEvent {
    pub id: String,
    pub user: String,
    pub guid: B256,
    pub dst_chain_id: u32,
    pub amount: U256,
    pub actual_amount: U256,
    pub block_number: u64,
    pub timestamp: u64,
    pub transaction_hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OftReceivedEvent {
    pub id: String,
    pub user: String,
    pub guid: B256,
    pub src_chain_id: u32,
    pub amount: U256,
    pub block_number: u64,
    pub timestamp: u64,
    pub transaction_hash: B256,
}

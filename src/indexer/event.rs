use alloy_primitives::{Address, TxHash, B256, U256};

/// Where and when an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    /// Emitting contract.
    pub contract: Address,
    pub transaction_hash: TxHash,
    pub log_index: u64,
    pub block_number: u64,
    /// Block timestamp in seconds.
    pub timestamp: u64,
}

impl EventMeta {
    /// Entity id of the event: `"<txhash>-<logIndex>"`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.transaction_hash, self.log_index)
    }
}

/// Decoded bridge event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Lock {
        user: Address,
        amount: U256,
        /// Block number reported by the contract itself.
        block_number: U256,
    },
    Unlock {
        user: Address,
        amount: U256,
        block_number: U256,
    },
    OftSent {
        guid: B256,
        dst_eid: u32,
        from: Address,
        amount_sent_ld: U256,
        amount_received_ld: U256,
    },
    OftReceived {
        guid: B256,
        src_eid: u32,
        to: Address,
        amount_received_ld: U256,
    },
}

impl BridgeEvent {
    /// Account the event is attributed to.
    pub fn user(&self) -> Address {
        match self {
            Self::Lock { user, .. } | Self::Unlock { user, .. } => *user,
            Self::OftSent { from, .. } => *from,
            Self::OftReceived { to, .. } => *to,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lock { .. } => "Lock",
            Self::Unlock { .. } => "Unlock",
            Self::OftSent { .. } => "OFTSent",
            Self::OftReceived { .. } => "OFTReceived",
        }
    }
}

/// A decoded event together with its log metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEvent {
    pub meta: EventMeta,
    pub event: BridgeEvent,
}

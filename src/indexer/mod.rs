//! Event indexer for the lock vault
//!
//! Turns `Lock`, `Unlock`, `OFTSent` and `OFTReceived` logs into queryable
//! entities:
//!
//! - [`User`]: total amount currently locked per account
//! - [`GlobalStat`]: total locked across all users and the number of users
//! - one record per event occurrence, keyed by `"<txhash>-<logIndex>"`
//!
//! Events are decoded from RPC logs with [`decode_log`] and applied in chain
//! order with [`Indexer::handle`]. Totals are signed and never clamped, so the
//! sum of all users' totals always equals the global total.

mod decode;
mod event;
mod mapping;
mod model;
mod store;

pub use decode::{decode_event, decode_log, encode_event, rpc_log};
pub use event::{BridgeEvent, EventMeta, IndexedEvent};
pub use mapping::Indexer;
pub use model::{
    user_id, GlobalStat, LockEvent, OftReceivedEvent, OftSentEvent, UnlockEvent, User,
    GLOBAL_STAT_ID,
};
pub use store::{InMemoryStore, Store};

use alloy_primitives::{Address, I256};
use tracing::{debug, info, instrument, warn};

use super::event::{BridgeEvent, IndexedEvent};
use super::model::{
    user_id, GlobalStat, LockEvent, OftReceivedEvent, OftSentEvent, User, GLOBAL_STAT_ID,
};
use super::store::Store;
use crate::error::{BridgeError, Result};

/// Applies bridge events to a [`Store`].
///
/// Users are created on first sight, counting towards
/// [`GlobalStat::user_count`]. `Lock` and `Unlock` move both the user's and
/// the global locked total with the same signed arithmetic, so the global
/// total always equals the locks minus unlocks indexed. OFT events are
/// recorded without touching totals.
#[derive(Debug, Default)]
pub struct Indexer<S: Store> {
    store: S,
}

impl<S: Store> Indexer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies events in order, stopping at the first failure.
    pub fn handle_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a IndexedEvent>,
    ) -> Result<usize> {
        let mut handled = 0;
        for event in events {
            self.handle(event)?;
            handled += 1;
        }
        info!(handled = handled, event = "events_indexed");
        Ok(handled)
    }

    /// Applies one event.
    ///
    /// Deltas are applied as emitted. An `Unlock` for a user the index has
    /// not seen lock creates the user and drives its total negative.
    #[instrument(skip(self, indexed), fields(event_name = indexed.event.name(), id = %indexed.meta.id()))]
    pub fn handle(&mut self, indexed: &IndexedEvent) -> Result<()> {
        let meta = &indexed.meta;
        let address = indexed.event.user();
        let id = user_id(address);

        match &indexed.event {
            BridgeEvent::Lock {
                amount,
                block_number,
                ..
            }
            | BridgeEvent::Unlock {
                amount,
                block_number,
                ..
            } => {
                let overflow = || BridgeError::AccountingOverflow {
                    user: address,
                    amount: *amount,
                };
                let magnitude = I256::try_from(*amount).map_err(|_| overflow())?;
                let is_lock = matches!(indexed.event, BridgeEvent::Lock { .. });
                let delta = if is_lock { magnitude } else { -magnitude };

                let mut user = self.get_or_create_user(address)?;
                let mut global = self.get_or_create_global_stat()?;
                user.total_locked = user.total_locked.checked_add(delta).ok_or_else(overflow)?;
                global.total_locked = global
                    .total_locked
                    .checked_add(delta)
                    .ok_or_else(overflow)?;

                let event = LockEvent {
                    id: meta.id(),
                    user: user.id.clone(),
                    amount: *amount,
                    block_number: *block_number,
                    timestamp: meta.timestamp,
                    transaction_hash: meta.transaction_hash,
                };
                if is_lock {
                    self.store.save_lock(event)?;
                } else {
                    self.store.save_unlock(event)?;
                }

                if user.total_locked.is_negative() {
                    warn!(
                        user = %id,
                        total_locked = %user.total_locked,
                        event = "negative_locked_total"
                    );
                }
                if global.total_locked.is_negative() {
                    warn!(
                        entity = GLOBAL_STAT_ID,
                        total_locked = %global.total_locked,
                        event = "negative_locked_total"
                    );
                }
                self.store.save_user(user)?;
                self.store.save_global_stat(global)?;
            }
            BridgeEvent::OftSent {
                guid,
                dst_eid,
                amount_sent_ld,
                amount_received_ld,
                ..
            } => {
                let user = self.get_or_create_user(address)?;
                self.store.save_oft_sent(OftSentEvent {
                    id: meta.id(),
                    user: user.id,
                    guid: *guid,
                    dst_chain_id: *dst_eid,
                    amount: *amount_sent_ld,
                    actual_amount: *amount_received_ld,
                    block_number: meta.block_number,
                    timestamp: meta.timestamp,
                    transaction_hash: meta.transaction_hash,
                })?;
            }
            BridgeEvent::OftReceived {
                guid,
                src_eid,
                amount_received_ld,
                ..
            } => {
                let user = self.get_or_create_user(address)?;
                self.store.save_oft_received(OftReceivedEvent {
                    id: meta.id(),
                    user: user.id,
                    guid: *guid,
                    src_chain_id: *src_eid,
                    amount: *amount_received_ld,
                    block_number: meta.block_number,
                    timestamp: meta.timestamp,
                    transaction_hash: meta.transaction_hash,
                })?;
            }
        }

        debug!(user = %id, event = "event_indexed");
        Ok(())
    }

    fn get_or_create_user(&mut self, address: Address) -> Result<User> {
        let id = user_id(address);
        if let Some(user) = self.store.load_user(&id)? {
            return Ok(user);
        }

        let user = User::new(address);
        self.store.save_user(user.clone())?;

        let mut global = self.get_or_create_global_stat()?;
        global.user_count += 1;
        self.store.save_global_stat(global)?;

        debug!(user = %id, event = "user_created");
        Ok(user)
    }

    fn get_or_create_global_stat(&mut self) -> Result<GlobalStat> {
        if let Some(global) = self.store.load_global_stat()? {
            return Ok(global);
        }
        let global = GlobalStat::default();
        self.store.save_global_stat(global.clone())?;
        Ok(global)
    }
}

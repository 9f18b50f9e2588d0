use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{
    GlobalStat, LockEvent, OftReceivedEvent, OftSentEvent, UnlockEvent, User, GLOBAL_STAT_ID,
};
use crate::error::Result;

/// Entity persistence used by the [`Indexer`](super::Indexer).
///
/// Loads return `None` for entities that were never saved. Saves overwrite.
pub trait Store {
    fn load_user(&self, id: &str) -> Result<Option<User>>;
    fn save_user(&mut self, user: User) -> Result<()>;

    fn load_global_stat(&self) -> Result<Option<GlobalStat>>;
    fn save_global_stat(&mut self, stat: GlobalStat) -> Result<()>;

    fn save_lock(&mut self, event: LockEvent) -> Result<()>;
    fn save_unlock(&mut self, event: UnlockEvent) -> Result<()>;
    fn save_oft_sent(&mut self, event: OftSentEvent) -> Result<()>;
    fn save_oft_received(&mut self, event: OftReceivedEvent) -> Result<()>;
}

/// Store keeping every entity in ordered maps keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryStore {
    pub users: BTreeMap<String, User>,
    pub global_stats: BTreeMap<String, GlobalStat>,
    pub lock_events: BTreeMap<String, LockEvent>,
    pub unlock_events: BTreeMap<String, UnlockEvent>,
    pub oft_sent_events: BTreeMap<String, OftSentEvent>,
    pub oft_received_events: BTreeMap<String, OftReceivedEvent>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_stat(&self) -> GlobalStat {
        self.global_stats
            .get(GLOBAL_STAT_ID)
            .cloned()
            .unwrap_or_default()
    }

    /// Pretty JSON of every entity.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Store for InMemoryStore {
    fn load_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.get(id).cloned())
    }

    fn save_user(&mut self, user: User) -> Result<()> {
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn load_global_stat(&self) -> Result<Option<GlobalStat>> {
        Ok(self.global_stats.get(GLOBAL_STAT_ID).cloned())
    }

    fn save_global_stat(&mut self, stat: GlobalStat) -> Result<()> {
        self.global_stats.insert(stat.id.clone(), stat);
        Ok(())
    }

    fn save_lock(&mut self, event: LockEvent) -> Result<()> {
        self.lock_events.insert(event.id.clone(), event);
        Ok(())
    }

    fn save_unlock(&mut self, event: UnlockEvent) -> Result<()> {
        self.unlock_events.insert(event.id.clone(), event);
        Ok(())
    }

    fn save_oft_sent(&mut self, event: OftSentEvent) -> Result<()> {
        self.oft_sent_events.insert(event.id.clone(), event);
        Ok(())
    }

    fn save_oft_received(&mut self, event: OftReceivedEvent) -> Result<()> {
        self.oft_received_events.insert(event.id.clone(), event);
        Ok(())
    }
}

use crate::config::{KeyValueStore, HISTORY_KEY, LAST_CHANNEL_KEY};
use crate::errors::Result;

pub const HISTORY_LIMIT: usize = 10;

/// Recently watched channel ids, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchHistory {
    ids: Vec<String>,
}

impl WatchHistory {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let ids = match store.get(HISTORY_KEY)? {
            // A damaged history is not worth failing over
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(Self { ids })
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(HISTORY_KEY, &serde_json::to_string(&self.ids)?)
    }

    /// Move `id` to the front, dropping older duplicates and the overflow
    pub fn record(&mut self, id: &str) {
        self.ids.retain(|existing| existing != id);
        self.ids.insert(0, id.to_string());
        self.ids.truncate(HISTORY_LIMIT);
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

pub fn last_watched_channel(store: &dyn KeyValueStore) -> Result<Option<String>> {
    store.get(LAST_CHANNEL_KEY)
}

pub fn set_last_watched_channel(store: &dyn KeyValueStore, id: &str) -> Result<()> {
    store.set(LAST_CHANNEL_KEY, id)
}

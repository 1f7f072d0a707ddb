//! Character storage hook.
//!
//! The realm works on live actors; between sessions a character exists
//! only as a [`CharacterRecord`] in some store. [`CharacterStore`] is the
//! seam: the server loads a record at login and saves one at logout.

use std::collections::HashMap;

use hearth_protocol::CharacterId;
use hearth_world::CharacterRecord;
use tokio::sync::Mutex;

use crate::SessionError;

/// Loads and saves character records.
pub trait CharacterStore: Send + Sync + 'static {
    /// Fetches the record for `identity`.
    ///
    /// Returns [`SessionError::RecordNotFound`] if the identity has never
    /// registered.
    fn load(
        &self,
        identity: &CharacterId,
    ) -> impl std::future::Future<Output = Result<CharacterRecord, SessionError>>
    + Send;

    /// Creates or replaces the record for `record.identity`.
    fn save(
        &self,
        record: CharacterRecord,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;
}

/// An in-process store. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCharacterStore {
    records: Mutex<HashMap<CharacterId, CharacterRecord>>,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `records`.
    pub fn with_records(
        records: impl IntoIterator<Item = CharacterRecord>,
    ) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.identity.clone(), r))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl CharacterStore for MemoryCharacterStore {
    async fn load(
        &self,
        identity: &CharacterId,
    ) -> Result<CharacterRecord, SessionError> {
        self.records
            .lock()
            .await
            .get(identity)
            .cloned()
            .ok_or_else(|| SessionError::RecordNotFound(identity.clone()))
    }

    async fn save(&self, record: CharacterRecord) -> Result<(), SessionError> {
        tracing::debug!(identity = %record.identity, "character saved");
        self.records
            .lock()
            .await
            .insert(record.identity.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CharacterRecord {
        CharacterRecord::new(CharacterId::new(id), "Ayla", "Red Bird", "warrior")
    }

    #[tokio::test]
    async fn test_load_unknown_identity_returns_record_not_found() {
        let store = MemoryCharacterStore::new();
        let result = store.load(&CharacterId::new("ghost")).await;
        assert!(matches!(result, Err(SessionError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn test_save_then_load_returns_latest_record() {
        let store = MemoryCharacterStore::with_records([record("u-1")]);

        let mut updated = record("u-1");
        updated.level = 4;
        store.save(updated).await.unwrap();

        let loaded = store.load(&CharacterId::new("u-1")).await.unwrap();
        assert_eq!(loaded.level, 4);
        assert_eq!(store.len().await, 1);
    }
}

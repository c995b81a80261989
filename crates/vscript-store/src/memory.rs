//! In-memory store backend.
//!
//! Accounts and records live behind a single `RwLock`; writes take the lock
//! exclusively, which serializes quota increments per process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use vscript_models::{CallerAccount, GenerationRecord};

use crate::error::{StoreError, StoreResult};
use crate::GenerationStore;

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, CallerAccount>,
    /// Records per caller id, oldest first
    records: HashMap<String, Vec<GenerationRecord>>,
}

/// In-memory implementation of [`GenerationStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account. Used at startup seeding and in tests.
    pub async fn upsert_account(&self, account: CallerAccount) {
        let mut inner = self.inner.write().await;
        info!(caller_id = %account.id, email = %account.email, "Seeded caller account");
        inner.accounts.insert(account.id.clone(), account);
    }

    /// Current quota counter for a caller, for assertions in tests.
    pub async fn generations_used(&self, caller_id: &str) -> Option<u32> {
        let inner = self.inner.read().await;
        inner.accounts.get(caller_id).map(|a| a.generations_used)
    }

    /// Number of records stored for a caller.
    pub async fn record_count(&self, caller_id: &str) -> usize {
        let inner = self.inner.read().await;
        inner.records.get(caller_id).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn find_caller_by_email(&self, email: &str) -> StoreResult<Option<CallerAccount>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_generation_record(&self, record: &GenerationRecord) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .records
            .entry(record.caller_id.clone())
            .or_default()
            .push(record.clone());
        info!(record_id = %record.id, caller_id = %record.caller_id, "Created generation record");
        Ok(())
    }

    async fn find_recent_generation_records(
        &self,
        caller_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<GenerationRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<GenerationRecord> = inner
            .records
            .get(caller_id)
            .map(|r| r.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn increment_quota(&self, caller_id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(caller_id)
            .ok_or_else(|| StoreError::not_found(format!("caller {caller_id}")))?;
        account.generations_used += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vscript_models::{
        GenerationSettings, PrimaryPlatform, ThemeInput, ThemeKind, VideoDuration,
    };

    fn record(caller_id: &str) -> GenerationRecord {
        GenerationRecord::new(
            caller_id,
            ThemeInput {
                kind: ThemeKind::Description,
                content: "a sufficiently long theme text".to_string(),
                target_audience: None,
                objective: None,
            },
            GenerationSettings {
                variant_count: 5,
                video_duration: VideoDuration::Standard,
                primary_platform: PrimaryPlatform::All,
            },
            vec![],
            None,
        )
    }

    #[tokio::test]
    async fn test_find_caller_by_email_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .upsert_account(CallerAccount::new("u1", "User@Example.com"))
            .await;

        let found = store.find_caller_by_email("user@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, "u1");

        let missing = store.find_caller_by_email("other@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_recent_records_newest_first_with_limit() {
        let store = MemoryStore::new();
        for _ in 0..7 {
            store.create_generation_record(&record("u1")).await.unwrap();
        }

        let recent = store.find_recent_generation_records("u1", 5).await.unwrap();
        assert_eq!(recent.len(), 5);
        for pair in recent.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_recent_records_empty_for_unknown_caller() {
        let store = MemoryStore::new();
        let recent = store.find_recent_generation_records("ghost", 5).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_increment_quota() {
        let store = MemoryStore::new();
        store.upsert_account(CallerAccount::new("u1", "a@b.c")).await;

        store.increment_quota("u1").await.unwrap();
        store.increment_quota("u1").await.unwrap();
        assert_eq!(store.generations_used("u1").await, Some(2));

        let err = store.increment_quota("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}

//! Storage boundary for caller accounts and generation records.
//!
//! The pipeline only ever talks to [`GenerationStore`]; the in-memory
//! backend is the reference implementation used by the binary and tests.
//! Quota counters are serialized per caller by the backend; the pipeline
//! does not implement its own locking.

pub mod error;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use async_trait::async_trait;

use vscript_models::{CallerAccount, GenerationRecord};

/// Record store reachable by caller id.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Look up the account behind a resolved session email.
    async fn find_caller_by_email(&self, email: &str) -> StoreResult<Option<CallerAccount>>;

    /// Persist one finished generation. Called exactly once per success.
    async fn create_generation_record(&self, record: &GenerationRecord) -> StoreResult<()>;

    /// Most recent records for a caller, newest first, capped at `limit`.
    async fn find_recent_generation_records(
        &self,
        caller_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<GenerationRecord>>;

    /// Atomically bump the caller's quota counter by one.
    async fn increment_quota(&self, caller_id: &str) -> StoreResult<()>;
}

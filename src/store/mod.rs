mod memory;
mod supabase;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::types::{Challenge, ChallengeStatus, NewChallenge};

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything that can go wrong at the store boundary. Callers treat every
/// variant the same way: log, keep the last snapshot, never retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Response parsing failed: {0}")]
    Parse(String),

    #[error("Challenge not found: {0}")]
    NotFound(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

/// Access to the `challenges` table. Each call is an independent request;
/// there are no transactions across calls and concurrent writers race with
/// last-write-wins semantics.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// All challenges ordered by `date` ascending
    async fn list_all(&self) -> StoreResult<Vec<Challenge>>;

    /// Append a new row; the store assigns the id
    async fn insert(&self, draft: NewChallenge) -> StoreResult<()>;

    /// Set status and player together on the identified row
    async fn update_status(
        &self,
        id: &str,
        status: ChallengeStatus,
        player: &str,
    ) -> StoreResult<()>;

    /// Name of this store, for logs
    fn name(&self) -> &str;
}

/// Connection settings for the managed database
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`
    pub supabase_url: Option<String>,
    /// Public API key
    pub supabase_key: Option<String>,
    /// Table holding the challenges
    pub table: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            table: "challenges".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    /// Load store settings from environment variables
    pub fn from_env() -> Self {
        let non_empty = |name: &str| {
            std::env::var(name).ok().and_then(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        };

        Self {
            supabase_url: non_empty("SUPABASE_URL"),
            supabase_key: non_empty("SUPABASE_ANON_KEY"),
            table: non_empty("CHALLENGES_TABLE").unwrap_or_else(|| "challenges".to_string()),
            timeout: non_empty("STORE_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
        }
    }

    /// Build the remote store. Fails when URL or key are missing.
    pub fn build_remote(&self) -> StoreResult<SupabaseStore> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => SupabaseStore::new(url, key, &self.table, self.timeout),
            _ => Err(StoreError::Config(
                "SUPABASE_URL and SUPABASE_ANON_KEY must both be set".to_string(),
            )),
        }
    }

    /// Remote store when configured, otherwise an empty in-memory store
    pub fn build_store(&self) -> Arc<dyn ChallengeStore> {
        match self.build_remote() {
            Ok(store) => {
                tracing::info!("Using remote challenge store at {}", store.base_url());
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!(
                    "{}. Falling back to in-memory store, challenges will not persist!",
                    e
                );
                Arc::new(MemoryStore::new())
            }
        }
    }
}

use crate::error::StorageError;
use crate::table::LinkTable;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for link store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored link in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The normalized URL that was shortened.
    pub original_url: String,
    /// How many times the link has been resolved.
    pub clicks: u64,
    /// When the link was created.
    pub created_at: Timestamp,
}

impl LinkRecord {
    /// Creates a record for a freshly shortened URL with no clicks.
    pub fn new(original_url: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            original_url: original_url.into(),
            clicks: 0,
            created_at,
        }
    }
}

/// Whole-table persistence for the code → record mapping.
///
/// Implementations read and replace the entire table at once. `save` must be
/// atomic from a reader's point of view: either the previous table or the new
/// one is observed, never a partial write.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Loads the persisted table.
    ///
    /// Returns an empty table when nothing has been persisted yet and
    /// `Err(StorageError::Read)` when persisted state exists but is unreadable.
    async fn load(&self) -> Result<LinkTable>;

    /// Replaces the persisted table with `table`.
    async fn save(&self, table: &LinkTable) -> Result<()>;
}

use async_trait::async_trait;
use parking_lot::Mutex;
use pinhole_core::repository::{LinkStore, Result};
use pinhole_core::LinkTable;
use std::sync::Arc;

/// In-memory implementation of the link store contract.
///
/// Holds the last saved table. Clones share the same snapshot, so a test can
/// hand one clone to a service and inspect what it "persisted" via another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    snapshot: Arc<Mutex<LinkTable>>,
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose persisted state is `table`.
    pub fn with_table(table: LinkTable) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(table)),
        }
    }

    /// Returns a copy of the last saved table.
    pub fn snapshot(&self) -> LinkTable {
        self.snapshot.lock().clone()
    }
}

#[async_trait]
impl LinkStore for InMemoryStore {
    async fn load(&self) -> Result<LinkTable> {
        Ok(self.snapshot.lock().clone())
    }

    async fn save(&self, table: &LinkTable) -> Result<()> {
        *self.snapshot.lock() = table.clone();
        Ok(())
    }
}

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;
pub use pinhole_core::repository::{LinkStore, Result};
pub use pinhole_core::StorageError;

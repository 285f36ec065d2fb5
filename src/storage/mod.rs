mod json_store;
mod memory;
mod store;

pub use json_store::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{ReviewStore, Result, StorageError};

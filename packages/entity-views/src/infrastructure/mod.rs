//! Infrastructure layer - View index store adapters

pub mod memory_store;

pub use memory_store::InMemoryViewIndexStore;

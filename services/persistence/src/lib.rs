//! Persistence service
//!
//! In-memory implementation of the store traits. SQL and cache backends are
//! external collaborators; anything that satisfies `types::store` can stand
//! in for this one.

pub mod memory;

pub use memory::MemoryStore;

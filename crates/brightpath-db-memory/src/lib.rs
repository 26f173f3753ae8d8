//! In-memory storage backend.
//!
//! Keeps every entity in concurrent hash maps. Intended for development,
//! tests and single-node deployments; nothing survives a restart.

mod store;

pub use store::MemoryStore;

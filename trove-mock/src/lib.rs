//! trove-mock
//!
//! Deterministic test doubles for the trove pipeline: a configurable
//! [`MockProvider`] and a [`MemoryStore`] implementing all three repository
//! traits over a single in-process map. Both are used by the workspace's
//! integration tests and are CI-safe (no network, no database).
#![warn(missing_docs)]

/// Configurable in-memory provider.
pub mod provider;
/// In-memory repository implementations.
pub mod store;

pub use provider::MockProvider;
pub use store::MemoryStore;

//! Local snapshot store, one JSON record per tracked API key.
//!
//! This module provides:
//! - The persisted `CredentialRecord` and its spend history
//! - Model-delta computation against the monotonic known set
//! - Atomic, owner-only persistence under the data directory

pub mod record;
pub mod store;
pub mod types;

pub use store::{SnapshotStore, TrackedKey};
pub use types::{CredentialRecord, KeyInfoSnapshot, SpendSample};

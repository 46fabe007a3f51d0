//! # Storage Module
//!
//! Persistence for parents, children, matches, registrations and contact messages.
//!
//! - **traits.rs** - the `Storage` abstraction and the versioned commit outcomes
//! - **memory.rs** - process-local backend, used for tests and `storage: memory`
//! - **sqlite/** - durable `sqlx` backend

pub mod memory;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use memory::InMemoryStorage;
pub use sqlite::DbConnection;
pub use traits::{
    AdmissionCommit, CancellationCommit, ChildStorage, ContactStorage, MatchStorage, ParentStorage,
    RegistrationStorage, StatusCommit, Storage,
};

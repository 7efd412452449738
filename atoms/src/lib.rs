//! Durable models of the task board and the stores that persist them.
//!
//! Every store is a trait so coordinators can be driven against DynamoDB in
//! production and against the in-memory implementations in tests.

pub mod storage;
pub mod tasks;
pub mod teams;
pub mod users;

#[cfg(feature = "memory")]
pub mod memory;

pub use storage::{StorageError, MAX_ATTEMPTS};

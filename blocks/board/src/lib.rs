//! Endpoint coordinators: authorize, validate, locate in state, write,
//! patch the state snapshot and re-issue it.

pub mod boards;
pub mod task;
pub mod tasks;
pub mod team;
pub mod users;

mod support;

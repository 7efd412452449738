pub mod model;
pub mod service;

pub use model::{Subtask, Task, TaskContent, COLUMN_COUNT, MAX_ORDER};
pub use service::*;

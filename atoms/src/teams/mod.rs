pub mod model;
pub mod service;

pub use model::{Team, TeamBoard, DEFAULT_BOARD_NAME, MAX_BOARDS};
pub use service::*;

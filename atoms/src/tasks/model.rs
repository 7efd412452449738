use serde::{Deserialize, Serialize};

/// Every board has exactly this many columns.
pub const COLUMN_COUNT: usize = 4;

/// Largest accepted sort key. Orders stay exact as JavaScript numbers.
pub const MAX_ORDER: i64 = (1 << 53) - 1;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subtask {
    pub title: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
}

/// A task row, keyed by (team_id, id) and indexed by board_id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    #[serde(rename = "teamID")]
    pub team_id: String,
    #[serde(rename = "boardID")]
    pub board_id: String,
    #[serde(rename = "colNo")]
    pub column: usize,
    pub id: String,
    pub title: String,
    pub description: String,
    /// Client sort key within the column. Gaps are expected after deletes.
    pub order: i64,
    pub subtasks: Vec<Subtask>,
}

/// The user-editable fields of a task.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TaskContent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

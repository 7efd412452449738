use serde::{Deserialize, Serialize};
use taskboard_atoms::tasks::{Task, COLUMN_COUNT, MAX_ORDER};

/// Identity, role and team of the caller. Immutable once issued.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthClaims {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(rename = "teamID")]
    pub team_id: String,
}

/// One-time permission to register into an existing team as a member.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InviteClaims {
    #[serde(rename = "teamID")]
    pub team_id: String,
}

/// Signed mirror of the layout of every board the caller can see: board IDs,
/// and per column the task IDs with their sort order. Nothing else.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StateClaims {
    pub boards: Vec<StateBoard>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StateBoard {
    pub id: String,
    pub columns: [StateColumn; COLUMN_COUNT],
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StateColumn {
    pub tasks: Vec<StateTask>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StateTask {
    pub id: String,
    pub order: i64,
}

/// Where a task sits inside a `StateClaims`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    pub board: usize,
    pub column: usize,
    pub index: usize,
}

impl StateBoard {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            columns: Default::default(),
        }
    }

    /// Rebuild a board's layout from its stored tasks, each column sorted by
    /// order. Tasks whose column is out of range are left out.
    pub fn from_tasks(id: impl Into<String>, tasks: &[Task]) -> Self {
        let mut board = Self::new(id);
        for task in tasks {
            match board.columns.get_mut(task.column) {
                Some(column) => column.tasks.push(StateTask {
                    id: task.id.clone(),
                    order: task.order,
                }),
                None => tracing::warn!(
                    "task {} on board {} has out-of-range column {}",
                    task.id,
                    board.id,
                    task.column
                ),
            }
        }
        for column in board.columns.iter_mut() {
            column.tasks.sort_by_key(|t| t.order);
        }
        board
    }
}

impl StateClaims {
    /// Index of the board with this ID, only if it occurs exactly once.
    pub fn locate_board(&self, board_id: &str) -> Option<usize> {
        let mut found = None;
        for (i, board) in self.boards.iter().enumerate() {
            if board.id == board_id {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    /// Position of the task with this ID, only if it occurs exactly once
    /// across all boards and columns.
    pub fn locate_task(&self, task_id: &str) -> Option<TaskLocation> {
        let mut found = None;
        for (b, board) in self.boards.iter().enumerate() {
            for (c, column) in board.columns.iter().enumerate() {
                for (i, task) in column.tasks.iter().enumerate() {
                    if task.id == task_id {
                        if found.is_some() {
                            return None;
                        }
                        found = Some(TaskLocation {
                            board: b,
                            column: c,
                            index: i,
                        });
                    }
                }
            }
        }
        found
    }

    /// Order for a task appended to a column: one past the current maximum,
    /// or 0 for an empty column. `None` once that would exceed `MAX_ORDER`.
    pub fn next_order(&self, board: usize, column: usize) -> Option<i64> {
        let max = self.boards[board].columns[column]
            .tasks
            .iter()
            .map(|t| t.order)
            .max();
        match max {
            None => Some(0),
            Some(max) => max.checked_add(1).filter(|order| *order <= MAX_ORDER),
        }
    }

    pub fn push_task(&mut self, board: usize, column: usize, task: StateTask) {
        self.boards[board].columns[column].tasks.push(task);
    }

    pub fn remove_task(&mut self, loc: TaskLocation) -> StateTask {
        self.boards[loc.board].columns[loc.column]
            .tasks
            .remove(loc.index)
    }

    /// Move a task to `column` with a new order, keeping the column sorted.
    pub fn move_task(&mut self, loc: TaskLocation, column: usize, order: i64) {
        let mut task = self.remove_task(loc);
        task.order = order;
        let tasks = &mut self.boards[loc.board].columns[column].tasks;
        tasks.push(task);
        tasks.sort_by_key(|t| t.order);
    }

    pub fn push_board(&mut self, board_id: impl Into<String>) {
        self.boards.push(StateBoard::new(board_id));
    }

    pub fn remove_board(&mut self, board: usize) -> StateBoard {
        self.boards.remove(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> StateClaims {
        let mut board = StateBoard::new("board-1");
        board.columns[0].tasks = vec![
            StateTask { id: "foo".to_string(), order: 0 },
            StateTask { id: "bar".to_string(), order: 4 },
        ];
        board.columns[2].tasks = vec![StateTask { id: "baz".to_string(), order: 1 }];
        StateClaims {
            boards: vec![board, StateBoard::new("board-2")],
        }
    }

    #[test]
    fn locate_finds_unique_ids() {
        let s = state();
        assert_eq!(s.locate_board("board-2"), Some(1));
        assert_eq!(
            s.locate_task("baz"),
            Some(TaskLocation { board: 0, column: 2, index: 0 })
        );
        assert_eq!(s.locate_task("qux"), None);
        assert_eq!(s.locate_board("board-3"), None);
    }

    #[test]
    fn locate_rejects_duplicated_ids() {
        let mut s = state();
        s.boards[1].columns[3].tasks.push(StateTask { id: "foo".to_string(), order: 0 });
        assert_eq!(s.locate_task("foo"), None);

        s.boards.push(StateBoard::new("board-1"));
        assert_eq!(s.locate_board("board-1"), None);
    }

    #[test]
    fn next_order_is_one_past_the_max() {
        let s = state();
        assert_eq!(s.next_order(0, 0), Some(5));
        assert_eq!(s.next_order(0, 1), Some(0));
    }

    #[test]
    fn next_order_stops_at_the_bound() {
        let mut s = state();
        s.boards[1].columns[0].tasks = vec![StateTask { id: "top".to_string(), order: MAX_ORDER }];
        assert_eq!(s.next_order(1, 0), None);

        s.boards[1].columns[0].tasks[0].order = i64::MAX;
        assert_eq!(s.next_order(1, 0), None);

        s.boards[1].columns[0].tasks[0].order = MAX_ORDER - 1;
        assert_eq!(s.next_order(1, 0), Some(MAX_ORDER));
    }

    #[test]
    fn sequential_appends_have_increasing_orders() {
        let mut s = state();
        let mut orders = Vec::new();
        for i in 0..10 {
            let order = s.next_order(1, 3).unwrap();
            s.push_task(1, 3, StateTask { id: format!("t{}", i), order });
            orders.push(order);
        }
        assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn move_task_keeps_target_column_sorted() {
        let mut s = state();
        let loc = s.locate_task("bar").unwrap();
        s.move_task(loc, 2, 0);
        let ids: Vec<_> = s.boards[0].columns[2].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["bar", "baz"]);
        assert_eq!(s.boards[0].columns[0].tasks.len(), 1);
    }

    #[test]
    fn layout_is_rebuilt_from_stored_tasks() {
        let task = |id: &str, column, order| Task {
            team_id: "team".to_string(),
            board_id: "board-1".to_string(),
            column,
            id: id.to_string(),
            title: "t".to_string(),
            description: String::new(),
            order,
            subtasks: vec![],
        };
        let board = StateBoard::from_tasks(
            "board-1",
            &[task("b", 1, 3), task("a", 1, 1), task("x", 9, 0)],
        );
        let ids: Vec<_> = board.columns[1].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(board.columns.iter().all(|c| c.tasks.iter().all(|t| t.id != "x")));
    }

    #[test]
    fn boards_must_have_four_columns() {
        let json = r#"{"boards":[{"id":"b","columns":[{"tasks":[]},{"tasks":[]}]}]}"#;
        assert!(serde_json::from_str::<StateClaims>(json).is_err());
    }
}

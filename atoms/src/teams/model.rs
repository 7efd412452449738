use serde::{Deserialize, Serialize};

/// A team never owns more than this many boards.
pub const MAX_BOARDS: usize = 3;

/// Name given to the board created alongside a new team.
pub const DEFAULT_BOARD_NAME: &str = "New Board";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TeamBoard {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
}

impl TeamBoard {
    pub fn has_member(&self, username: &str) -> bool {
        self.members.iter().any(|m| m == username)
    }
}

/// A team row. `version` is bumped on every write and guards the
/// read-modify-write of the `boards` array.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub members: Vec<String>,
    pub boards: Vec<TeamBoard>,
    #[serde(skip)]
    pub version: u64,
}

impl Team {
    /// A fresh team owned by `admin` with a single default board.
    pub fn new(id: &str, admin: &str, board_id: &str) -> Self {
        Self {
            id: id.to_string(),
            members: vec![admin.to_string()],
            boards: vec![TeamBoard {
                id: board_id.to_string(),
                name: DEFAULT_BOARD_NAME.to_string(),
                members: vec![admin.to_string()],
            }],
            version: 0,
        }
    }

    pub fn has_member(&self, username: &str) -> bool {
        self.members.iter().any(|m| m == username)
    }

    pub fn board(&self, board_id: &str) -> Option<&TeamBoard> {
        self.boards.iter().find(|b| b.id == board_id)
    }
}

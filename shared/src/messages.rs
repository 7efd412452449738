//! Client-facing error messages. The frontend matches on some of these.

pub const AUTH_NOT_FOUND: &str = "Auth token not found.";
pub const AUTH_INVALID: &str = "Invalid auth token.";
pub const NOT_ADMIN: &str = "Only team admins can perform this action.";

pub const STATE_NOT_FOUND: &str = "State token not found.";
pub const STATE_INVALID: &str = "Invalid state token.";
pub const INVITE_INVALID: &str = "Invalid invite token.";

pub const INVALID_TASK_ID: &str = "Invalid task ID.";
pub const INVALID_BOARD_ID: &str = "Invalid board ID.";
pub const NO_BOARD_ACCESS: &str = "You do not have access to this board.";
pub const INVALID_COLUMN: &str = "Invalid column.";
pub const INVALID_ORDER: &str = "Invalid task order.";
pub const INVALID_BOARD_MEMBERS: &str = "Board members must belong to the team.";
pub const MAX_BOARDS: &str = "Max boards reached.";

pub const TASK_NOT_FOUND: &str = "Task not found.";
pub const BOARD_NOT_FOUND: &str = "Board not found.";
pub const TEAM_NOT_FOUND: &str = "Team not found.";

pub const USERNAME_TAKEN: &str = "Username is already taken.";
pub const BAD_CREDENTIALS: &str = "Invalid username or password.";
pub const INVALID_BODY: &str = "Invalid request body.";

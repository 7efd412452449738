use serde::{Deserialize, Serialize};

/// A registered user. The password is only ever stored as a hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(rename = "teamID")]
    pub team_id: String,
}

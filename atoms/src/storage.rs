use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::str::FromStr;

/// A raw DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

/// Upper bound on every retry loop in the storage layer: UUID regeneration on
/// a duplicate key and re-reads after a version conflict on the team row.
pub const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Conditional insert failed because the key is already taken.
    #[error("an item with the same key already exists")]
    DupKey,
    /// Conditional update/delete failed because the key is absent.
    #[error("item not found")]
    NoItem,
    /// The team already owns the maximum number of boards.
    #[error("board limit reached")]
    LimitReached,
    /// A board member list names someone outside the team.
    #[error("{0} is not a member of the team")]
    NotTeamMember(String),
    /// The team row changed between read and write.
    #[error("team row was modified concurrently")]
    Conflict,
    #[error("DynamoDB {op} error: {message}")]
    Dynamo { op: &'static str, message: String },
    #[error("corrupt item: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub(crate) fn dynamo(op: &'static str, err: impl std::fmt::Display) -> Self {
        StorageError::Dynamo {
            op,
            message: err.to_string(),
        }
    }
}

pub(crate) fn key(pk: &str, sk: &str) -> Item {
    let mut key = HashMap::new();
    key.insert("PK".to_string(), AttributeValue::S(pk.to_string()));
    key.insert("SK".to_string(), AttributeValue::S(sk.to_string()));
    key
}

pub(crate) fn get_s(item: &Item, name: &str) -> Result<String, StorageError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| StorageError::Corrupt(format!("missing string attribute {}", name)))
}

/// Optional string attribute; absent values read as empty.
pub(crate) fn get_s_or_default(item: &Item, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

pub(crate) fn get_n<T: FromStr>(item: &Item, name: &str) -> Result<T, StorageError> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StorageError::Corrupt(format!("missing numeric attribute {}", name)))
}

pub(crate) fn get_bool(item: &Item, name: &str) -> bool {
    item.get(name)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false)
}

pub(crate) fn get_list<'a>(item: &'a Item, name: &str) -> &'a [AttributeValue] {
    item.get(name)
        .and_then(|v| v.as_l().ok())
        .map(|l| l.as_slice())
        .unwrap_or(&[])
}

pub(crate) fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

pub(crate) fn read_string_list(values: &[AttributeValue]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .collect()
}

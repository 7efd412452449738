use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{Team, TeamBoard, MAX_BOARDS};
use crate::storage::{
    get_list, get_n, get_s, key, read_string_list, string_list, Item, StorageError, MAX_ATTEMPTS,
};

#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Fetch a team row. Fails with `NoItem` if absent.
    async fn get(&self, team_id: &str) -> Result<Team, StorageError>;

    /// Insert a new team row. Fails with `DupKey` if the team already exists.
    async fn insert(&self, team: &Team) -> Result<(), StorageError>;

    /// Overwrite a team row only if its stored version is still `expected`.
    /// Fails with `Conflict` otherwise (including when the row is gone).
    async fn replace(&self, team: &Team, expected: u64) -> Result<(), StorageError>;
}

/// Read the team, apply `mutate` to it and write it back guarded by the
/// version read. A concurrent writer causes a fresh read and a re-run of
/// `mutate`, so dup and limit checks always see the row being replaced.
pub async fn modify_team<F>(
    store: &dyn TeamStore,
    team_id: &str,
    mut mutate: F,
) -> Result<Team, StorageError>
where
    F: FnMut(&mut Team) -> Result<(), StorageError> + Send,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let mut team = store.get(team_id).await?;
        let expected = team.version;
        mutate(&mut team)?;
        team.version = expected + 1;

        match store.replace(&team, expected).await {
            Ok(()) => return Ok(team),
            Err(StorageError::Conflict) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    "team {} changed under us (attempt {}/{}), re-reading",
                    team_id,
                    attempt,
                    MAX_ATTEMPTS
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Append a board to the team. `DupKey` if the ID is taken within the team,
/// `LimitReached` if the team already has `MAX_BOARDS` boards.
pub async fn insert_board(
    store: &dyn TeamStore,
    team_id: &str,
    board: TeamBoard,
) -> Result<Team, StorageError> {
    modify_team(store, team_id, |team| {
        if team.boards.iter().any(|b| b.id == board.id) {
            return Err(StorageError::DupKey);
        }
        if team.boards.len() >= MAX_BOARDS {
            return Err(StorageError::LimitReached);
        }
        team.boards.push(board.clone());
        Ok(())
    })
    .await
}

/// Rename a board and optionally replace its member list. Every listed
/// member must already belong to the team, else `NotTeamMember`.
pub async fn update_board(
    store: &dyn TeamStore,
    team_id: &str,
    board_id: &str,
    name: &str,
    members: Option<&[String]>,
) -> Result<Team, StorageError> {
    modify_team(store, team_id, |team| {
        if let Some(outsider) = members
            .into_iter()
            .flatten()
            .find(|m| !team.has_member(m))
        {
            return Err(StorageError::NotTeamMember(outsider.clone()));
        }
        let board = team
            .boards
            .iter_mut()
            .find(|b| b.id == board_id)
            .ok_or(StorageError::NoItem)?;
        board.name = name.to_string();
        if let Some(members) = members {
            board.members = members.to_vec();
        }
        Ok(())
    })
    .await
}

pub async fn delete_board(
    store: &dyn TeamStore,
    team_id: &str,
    board_id: &str,
) -> Result<Team, StorageError> {
    modify_team(store, team_id, |team| {
        let idx = team
            .boards
            .iter()
            .position(|b| b.id == board_id)
            .ok_or(StorageError::NoItem)?;
        team.boards.remove(idx);
        Ok(())
    })
    .await
}

/// Add `username` to the team's members unless already present.
pub async fn add_member(
    store: &dyn TeamStore,
    team_id: &str,
    username: &str,
) -> Result<Team, StorageError> {
    modify_team(store, team_id, |team| {
        if !team.has_member(username) {
            team.members.push(username.to_string());
        }
        Ok(())
    })
    .await
}

/// Teams live at PK = SK = "TEAM#{team_id}".
pub struct DynamoTeamStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoTeamStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn team_pk(team_id: &str) -> String {
    format!("TEAM#{}", team_id)
}

fn team_item(team: &Team) -> Item {
    let pk = team_pk(&team.id);
    let boards = team
        .boards
        .iter()
        .map(|b| {
            let mut m = HashMap::new();
            m.insert("id".to_string(), AttributeValue::S(b.id.clone()));
            m.insert("name".to_string(), AttributeValue::S(b.name.clone()));
            m.insert("members".to_string(), string_list(&b.members));
            AttributeValue::M(m)
        })
        .collect();

    let mut item = key(&pk, &pk);
    item.insert("id".to_string(), AttributeValue::S(team.id.clone()));
    item.insert("members".to_string(), string_list(&team.members));
    item.insert("boards".to_string(), AttributeValue::L(boards));
    item.insert("version".to_string(), AttributeValue::N(team.version.to_string()));
    item
}

fn team_from_item(item: &Item) -> Result<Team, StorageError> {
    let mut boards = Vec::new();
    for value in get_list(item, "boards") {
        let m = value
            .as_m()
            .map_err(|_| StorageError::Corrupt("board entry is not a map".to_string()))?;
        boards.push(TeamBoard {
            id: get_s(m, "id")?,
            name: get_s(m, "name")?,
            members: read_string_list(get_list(m, "members")),
        });
    }

    Ok(Team {
        id: get_s(item, "id")?,
        members: read_string_list(get_list(item, "members")),
        boards,
        version: get_n(item, "version")?,
    })
}

#[async_trait]
impl TeamStore for DynamoTeamStore {
    async fn get(&self, team_id: &str) -> Result<Team, StorageError> {
        let pk = team_pk(team_id);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key(&pk, &pk)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StorageError::dynamo("get_item", e))?;

        let item = result.item().ok_or(StorageError::NoItem)?;
        team_from_item(item)
    }

    async fn insert(&self, team: &Team) -> Result<(), StorageError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(team_item(team)))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::DupKey)
            }
            Err(e) => Err(StorageError::dynamo("put_item", e)),
        }
    }

    async fn replace(&self, team: &Team, expected: u64) -> Result<(), StorageError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(team_item(team)))
            .condition_expression("#version = :expected")
            .expression_attribute_names("#version", "version")
            .expression_attribute_values(":expected", AttributeValue::N(expected.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::Conflict)
            }
            Err(e) => Err(StorageError::dynamo("put_item", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_item_round_trips() {
        let mut team = Team::new("team-1", "bob123", "board-1");
        team.members.push("alice1".to_string());
        team.version = 7;

        let decoded = team_from_item(&team_item(&team)).unwrap();
        assert_eq!(decoded, team);
        assert_eq!(decoded.version, 7);
    }

    #[test]
    fn board_entries_must_be_maps() {
        let mut item = team_item(&Team::new("team-1", "bob123", "board-1"));
        item.insert(
            "boards".to_string(),
            AttributeValue::L(vec![AttributeValue::S("oops".to_string())]),
        );
        assert!(matches!(team_from_item(&item), Err(StorageError::Corrupt(_))));
    }
}

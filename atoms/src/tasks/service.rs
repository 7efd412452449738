use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tokio::time::{sleep, Duration};

use super::model::{Subtask, Task, TaskContent};
use crate::storage::{
    get_bool, get_list, get_n, get_s, get_s_or_default, key, Item, StorageError,
};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a task. Fails with `DupKey` if (team_id, id) is taken.
    async fn insert(&self, task: &Task) -> Result<(), StorageError>;

    /// Overwrite title, description and subtasks. Fails with `NoItem` if absent.
    async fn update(
        &self,
        team_id: &str,
        task_id: &str,
        content: &TaskContent,
    ) -> Result<(), StorageError>;

    /// Move a task to another column and/or order. Fails with `NoItem` if absent.
    async fn set_position(
        &self,
        team_id: &str,
        task_id: &str,
        column: usize,
        order: i64,
    ) -> Result<(), StorageError>;

    /// Delete a task. Fails with `NoItem` if absent.
    async fn delete(&self, team_id: &str, task_id: &str) -> Result<(), StorageError>;

    /// All tasks on a board, in no particular order.
    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Task>, StorageError>;

    /// Delete every task on a board, returning how many were removed.
    async fn delete_by_board(&self, team_id: &str, board_id: &str) -> Result<usize, StorageError>;
}

/// Tasks live at PK = "TEAM#{team_id}", SK = "TASK#{task_id}" with a global
/// secondary index on `boardID`.
pub struct DynamoTaskStore {
    client: DynamoClient,
    table_name: String,
    board_index: String,
}

impl DynamoTaskStore {
    pub fn new(
        client: DynamoClient,
        table_name: impl Into<String>,
        board_index: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            board_index: board_index.into(),
        }
    }

    /// Batch delete keys (25 per request), retrying unprocessed items.
    async fn batch_delete(&self, keys: Vec<Item>) -> Result<(), StorageError> {
        for chunk in keys.chunks(25) {
            let mut write_reqs = Vec::with_capacity(chunk.len());
            for k in chunk {
                let req = DeleteRequest::builder()
                    .set_key(Some(k.clone()))
                    .build()
                    .map_err(|e| StorageError::dynamo("batch_write_item", e))?;
                write_reqs.push(WriteRequest::builder().delete_request(req).build());
            }

            let mut unprocessed = Some(write_reqs);
            let mut attempts = 0;
            while let Some(reqs) = unprocessed {
                attempts += 1;
                let result = self
                    .client
                    .batch_write_item()
                    .request_items(&self.table_name, reqs)
                    .send()
                    .await
                    .map_err(|e| StorageError::dynamo("batch_write_item", e))?;

                unprocessed = result
                    .unprocessed_items()
                    .and_then(|m| m.get(&self.table_name))
                    .filter(|v| !v.is_empty())
                    .cloned();

                if unprocessed.is_some() && attempts < 5 {
                    sleep(Duration::from_millis(100 * attempts)).await;
                } else if unprocessed.is_some() {
                    return Err(StorageError::dynamo(
                        "batch_write_item",
                        "unprocessed items remained after 5 attempts",
                    ));
                }
            }
        }

        Ok(())
    }
}

fn task_pk(team_id: &str) -> String {
    format!("TEAM#{}", team_id)
}

fn task_sk(task_id: &str) -> String {
    format!("TASK#{}", task_id)
}

fn subtasks_value(subtasks: &[Subtask]) -> AttributeValue {
    AttributeValue::L(
        subtasks
            .iter()
            .map(|s| {
                let mut m = HashMap::new();
                m.insert("title".to_string(), AttributeValue::S(s.title.clone()));
                m.insert("isDone".to_string(), AttributeValue::Bool(s.is_done));
                AttributeValue::M(m)
            })
            .collect(),
    )
}

fn task_item(task: &Task) -> Item {
    let mut item = key(&task_pk(&task.team_id), &task_sk(&task.id));
    item.insert("teamID".to_string(), AttributeValue::S(task.team_id.clone()));
    item.insert("boardID".to_string(), AttributeValue::S(task.board_id.clone()));
    item.insert("colNo".to_string(), AttributeValue::N(task.column.to_string()));
    item.insert("id".to_string(), AttributeValue::S(task.id.clone()));
    item.insert("title".to_string(), AttributeValue::S(task.title.clone()));
    item.insert("description".to_string(), AttributeValue::S(task.description.clone()));
    item.insert("order".to_string(), AttributeValue::N(task.order.to_string()));
    item.insert("subtasks".to_string(), subtasks_value(&task.subtasks));
    item
}

fn task_from_item(item: &Item) -> Result<Task, StorageError> {
    let mut subtasks = Vec::new();
    for value in get_list(item, "subtasks") {
        let m = value
            .as_m()
            .map_err(|_| StorageError::Corrupt("subtask entry is not a map".to_string()))?;
        subtasks.push(Subtask {
            title: get_s(m, "title")?,
            is_done: get_bool(m, "isDone"),
        });
    }

    Ok(Task {
        team_id: get_s(item, "teamID")?,
        board_id: get_s(item, "boardID")?,
        column: get_n(item, "colNo")?,
        id: get_s(item, "id")?,
        title: get_s(item, "title")?,
        description: get_s_or_default(item, "description"),
        order: get_n(item, "order")?,
        subtasks,
    })
}

#[async_trait]
impl TaskStore for DynamoTaskStore {
    async fn insert(&self, task: &Task) -> Result<(), StorageError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_item(task)))
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

    async fn update(
        &self,
        team_id: &str,
        task_id: &str,
        content: &TaskContent,
    ) -> Result<(), StorageError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key(&task_pk(team_id), &task_sk(task_id))))
            .update_expression("SET #title = :title, #description = :description, #subtasks = :subtasks")
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_names("#title", "title")
            .expression_attribute_names("#description", "description")
            .expression_attribute_names("#subtasks", "subtasks")
            .expression_attribute_values(":title", AttributeValue::S(content.title.clone()))
            .expression_attribute_values(
                ":description",
                AttributeValue::S(content.description.clone()),
            )
            .expression_attribute_values(":subtasks", subtasks_value(&content.subtasks))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::NoItem)
            }
            Err(e) => Err(StorageError::dynamo("update_item", e)),
        }
    }

    async fn set_position(
        &self,
        team_id: &str,
        task_id: &str,
        column: usize,
        order: i64,
    ) -> Result<(), StorageError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key(&task_pk(team_id), &task_sk(task_id))))
            .update_expression("SET #colNo = :colNo, #order = :order")
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_names("#colNo", "colNo")
            .expression_attribute_names("#order", "order")
            .expression_attribute_values(":colNo", AttributeValue::N(column.to_string()))
            .expression_attribute_values(":order", AttributeValue::N(order.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::NoItem)
            }
            Err(e) => Err(StorageError::dynamo("update_item", e)),
        }
    }

    async fn delete(&self, team_id: &str, task_id: &str) -> Result<(), StorageError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key(&task_pk(team_id), &task_sk(task_id))))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::NoItem)
            }
            Err(e) => Err(StorageError::dynamo("delete_item", e)),
        }
    }

    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Task>, StorageError> {
        let mut tasks = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.board_index)
                .key_condition_expression("boardID = :boardID")
                .expression_attribute_values(":boardID", AttributeValue::S(board_id.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StorageError::dynamo("query", e))?;

            for item in result.items() {
                tasks.push(task_from_item(item)?);
            }

            match result.last_evaluated_key() {
                Some(k) if !k.is_empty() => start_key = Some(k.clone()),
                _ => break,
            }
        }

        Ok(tasks)
    }

    async fn delete_by_board(&self, team_id: &str, board_id: &str) -> Result<usize, StorageError> {
        let keys: Vec<Item> = self
            .list_by_board(board_id)
            .await?
            .iter()
            .filter(|t| t.team_id == team_id)
            .map(|t| key(&task_pk(&t.team_id), &task_sk(&t.id)))
            .collect();

        let count = keys.len();
        self.batch_delete(keys).await?;
        Ok(count)
    }
}

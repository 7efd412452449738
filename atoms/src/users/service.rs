use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::User;
use crate::storage::{get_bool, get_s, key, StorageError};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `DupKey` if the username is taken.
    async fn insert(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by name. Fails with `NoItem` if absent.
    async fn get(&self, username: &str) -> Result<User, StorageError>;
}

/// Users live at PK = SK = "USER#{username}".
pub struct DynamoUserStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoUserStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn user_pk(username: &str) -> String {
    format!("USER#{}", username)
}

#[async_trait]
impl UserStore for DynamoUserStore {
    async fn insert(&self, user: &User) -> Result<(), StorageError> {
        let pk = user_pk(&user.username);

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(pk.clone()))
            .item("SK", AttributeValue::S(pk))
            .item("username", AttributeValue::S(user.username.clone()))
            .item("password", AttributeValue::S(user.password_hash.clone()))
            .item("isAdmin", AttributeValue::Bool(user.is_admin))
            .item("teamID", AttributeValue::S(user.team_id.clone()))
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

    async fn get(&self, username: &str) -> Result<User, StorageError> {
        let pk = user_pk(username);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key(&pk, &pk)))
            .send()
            .await
            .map_err(|e| StorageError::dynamo("get_item", e))?;

        let item = result.item().ok_or(StorageError::NoItem)?;
        Ok(User {
            username: get_s(item, "username")?,
            password_hash: get_s(item, "password")?,
            is_admin: get_bool(item, "isAdmin"),
            team_id: get_s(item, "teamID")?,
        })
    }
}

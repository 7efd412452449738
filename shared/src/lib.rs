pub mod auth;
pub mod config;
pub mod error;
pub mod messages;
pub mod response;

use aws_sdk_dynamodb::Client as DynamoClient;
use std::sync::Arc;

use auth::{AuthClaims, BcryptHasher, Hasher, IdGenerator, InviteClaims, StateClaims, TokenCodec, UuidGenerator};
use config::AppConfig;
use taskboard_atoms::tasks::{DynamoTaskStore, TaskStore};
use taskboard_atoms::teams::{DynamoTeamStore, TeamStore};
use taskboard_atoms::users::{DynamoUserStore, UserStore};

pub use error::ApiError;

/// Everything a request handler needs, built once per cold start.
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserStore>,
    pub teams: Arc<dyn TeamStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub hasher: Arc<dyn Hasher>,
    pub ids: Arc<dyn IdGenerator>,
    pub auth_codec: TokenCodec<AuthClaims>,
    pub state_codec: TokenCodec<StateClaims>,
    pub invite_codec: TokenCodec<InviteClaims>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        teams: Arc<dyn TeamStore>,
        tasks: Arc<dyn TaskStore>,
        hasher: Arc<dyn Hasher>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let key = config.jwt_key.as_bytes();
        Self {
            auth_codec: TokenCodec::new(key, auth::cookies::AUTH_TOKEN),
            state_codec: TokenCodec::new(key, auth::cookies::STATE_TOKEN),
            invite_codec: TokenCodec::new(key, auth::cookies::INVITE_TOKEN),
            config,
            users,
            teams,
            tasks,
            hasher,
            ids,
        }
    }

    /// Production wiring: DynamoDB stores, bcrypt and random UUIDs.
    pub fn with_dynamo(config: AppConfig, client: DynamoClient) -> Self {
        let users = Arc::new(DynamoUserStore::new(client.clone(), &config.table_name));
        let teams = Arc::new(DynamoTeamStore::new(client.clone(), &config.table_name));
        let tasks = Arc::new(DynamoTaskStore::new(
            client,
            &config.table_name,
            &config.board_index_name,
        ));
        Self::new(
            config,
            users,
            teams,
            tasks,
            Arc::new(BcryptHasher::default()),
            Arc::new(UuidGenerator),
        )
    }
}

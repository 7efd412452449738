use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_KEY must be set to a non-empty value")]
    MissingJwtKey,
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub table_name: String,
    pub board_index_name: String,
    pub jwt_key: String,
    pub auth_token_ttl_secs: i64,
    pub state_token_ttl_secs: i64,
    pub invite_token_ttl_secs: i64,
    pub allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table_name: "taskboard".to_string(),
            board_index_name: "BoardIndex".to_string(),
            jwt_key: String::new(),
            auth_token_ttl_secs: 3600,
            state_token_ttl_secs: 3600,
            invite_token_ttl_secs: 3600,
            allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("TABLE_NAME") {
            config.table_name = v;
        }
        if let Some(v) = lookup("BOARD_INDEX_NAME") {
            config.board_index_name = v;
        }
        if let Some(v) = lookup("ALLOWED_ORIGIN") {
            config.allowed_origin = v;
        }
        config.auth_token_ttl_secs =
            parse_ttl(&lookup, "AUTH_TOKEN_TTL_SECS", config.auth_token_ttl_secs)?;
        config.state_token_ttl_secs =
            parse_ttl(&lookup, "STATE_TOKEN_TTL_SECS", config.state_token_ttl_secs)?;
        config.invite_token_ttl_secs =
            parse_ttl(&lookup, "INVITE_TOKEN_TTL_SECS", config.invite_token_ttl_secs)?;

        config.jwt_key = lookup("JWT_KEY").unwrap_or_default();
        if config.jwt_key.trim().is_empty() {
            return Err(ConfigError::MissingJwtKey);
        }

        Ok(config)
    }
}

fn parse_ttl<F>(lookup: &F, name: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}

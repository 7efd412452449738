use chrono::Duration;
use lambda_http::{Request, RequestExt};
use serde::de::DeserializeOwned;
use std::future::Future;

use taskboard_atoms::{StorageError, MAX_ATTEMPTS};
use taskboard_shared::auth::{cookies, AuthClaims, IdGenerator, InviteClaims, StateClaims};
use taskboard_shared::{messages, ApiError, AppState};

pub(crate) fn parse_body<T: DeserializeOwned>(event: &Request) -> Result<T, ApiError> {
    serde_json::from_slice(event.body()).map_err(|e| {
        tracing::info!("rejected request body: {}", e);
        ApiError::bad_request(messages::INVALID_BODY)
    })
}

pub(crate) fn query_param(event: &Request, name: &str) -> Option<String> {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first(name))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

pub(crate) fn check(result: Result<(), &'static str>) -> Result<(), ApiError> {
    result.map_err(ApiError::bad_request)
}

/// Run `insert` with fresh IDs until it stops hitting duplicate keys, at
/// most `MAX_ATTEMPTS` times. Exhaustion returns the final `DupKey`.
pub(crate) async fn with_fresh_id<T, F, Fut>(
    ids: &dyn IdGenerator,
    what: &str,
    mut insert: F,
) -> Result<T, StorageError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match insert(ids.next_id()).await {
            Ok(value) => return Ok(value),
            Err(StorageError::DupKey) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    "{} ID collided (attempt {}/{}), regenerating",
                    what,
                    attempt,
                    MAX_ATTEMPTS
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sign the patched state. Called after the storage write has committed, so
/// a failure here leaves the client to resynchronise by re-fetching.
pub(crate) fn state_cookie(app: &AppState, state: &StateClaims) -> Result<String, ApiError> {
    let ttl = app.config.state_token_ttl_secs;
    let token = app
        .state_codec
        .encode(state, Duration::seconds(ttl))
        .map_err(|e| ApiError::internal("encode state token after committed write", e))?;
    Ok(cookies::set(cookies::STATE_TOKEN, &token, ttl))
}

pub(crate) fn auth_cookie(app: &AppState, claims: &AuthClaims) -> Result<String, ApiError> {
    let ttl = app.config.auth_token_ttl_secs;
    let token = app
        .auth_codec
        .encode(claims, Duration::seconds(ttl))
        .map_err(|e| ApiError::internal("encode auth token", e))?;
    Ok(cookies::set(cookies::AUTH_TOKEN, &token, ttl))
}

pub(crate) fn invite_cookie(app: &AppState, claims: &InviteClaims) -> Result<String, ApiError> {
    let ttl = app.config.invite_token_ttl_secs;
    let token = app
        .invite_codec
        .encode(claims, Duration::seconds(ttl))
        .map_err(|e| ApiError::internal("encode invite token", e))?;
    Ok(cookies::set(cookies::INVITE_TOKEN, &token, ttl))
}

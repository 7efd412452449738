use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::Deserialize;

use crate::support::{auth_cookie, check, parse_body};
use taskboard_atoms::users::User;
use taskboard_atoms::StorageError;
use taskboard_shared::auth::{cookies, read_invite, validate, AuthClaims};
use taskboard_shared::error::respond;
use taskboard_shared::{messages, response, ApiError, AppState};

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// POST /user/register
///
/// Without an invite the caller becomes the admin of a brand-new team (the
/// team row itself is created on their first `GET /team`). With a valid
/// invite they join the inviting team as a member and the invite is cleared.
pub async fn register(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_register(app, event).await)
}

async fn try_register(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let creds: Credentials = parse_body(event)?;
    check(validate::username(&creds.username))?;
    check(validate::password(&creds.password))?;

    let cookie_header = cookies::cookie_header(event);
    let invite = read_invite(&app.invite_codec, cookie_header.as_deref())?;
    let invited = invite.is_some();
    let (team_id, is_admin) = match invite {
        Some(invite) => (invite.team_id, false),
        None => (app.ids.next_id(), true),
    };

    let password_hash = app
        .hasher
        .hash(&creds.password)
        .map_err(|e| ApiError::internal("hash password", e))?;

    let user = User {
        username: creds.username,
        password_hash,
        is_admin,
        team_id,
    };
    match app.users.insert(&user).await {
        Ok(()) => {}
        Err(StorageError::DupKey) => return Err(ApiError::bad_request(messages::USERNAME_TAKEN)),
        Err(e) => return Err(ApiError::storage("insert user", e)),
    }

    tracing::info!(
        "registered {} into team {} (admin: {})",
        user.username,
        user.team_id,
        user.is_admin
    );

    let claims = AuthClaims {
        username: user.username,
        is_admin: user.is_admin,
        team_id: user.team_id,
    };
    let mut set_cookies = vec![auth_cookie(app, &claims)?];
    if invited {
        set_cookies.push(cookies::clear(cookies::INVITE_TOKEN));
    }

    response::json(StatusCode::OK, &claims, &set_cookies)
}

/// POST /user/login
pub async fn login(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_login(app, event).await)
}

async fn try_login(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let creds: Credentials = parse_body(event)?;
    if creds.username.is_empty() || creds.password.is_empty() {
        return Err(ApiError::bad_request(messages::BAD_CREDENTIALS));
    }

    let user = match app.users.get(&creds.username).await {
        Ok(user) => user,
        Err(StorageError::NoItem) => return Err(ApiError::bad_request(messages::BAD_CREDENTIALS)),
        Err(e) => return Err(ApiError::storage("get user", e)),
    };

    let matches = app
        .hasher
        .verify(&creds.password, &user.password_hash)
        .map_err(|e| ApiError::internal("verify password", e))?;
    if !matches {
        return Err(ApiError::bad_request(messages::BAD_CREDENTIALS));
    }

    let claims = AuthClaims {
        username: user.username,
        is_admin: user.is_admin,
        team_id: user.team_id,
    };
    let set_cookies = vec![auth_cookie(app, &claims)?];

    response::json(StatusCode::OK, &claims, &set_cookies)
}

use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};

use crate::support::{check, parse_body, query_param, state_cookie, with_fresh_id};
use taskboard_atoms::teams::{self, TeamBoard, MAX_BOARDS};
use taskboard_atoms::StorageError;
use taskboard_shared::auth::{authorize, cookies, read_state, validate, Role};
use taskboard_shared::error::respond;
use taskboard_shared::{messages, response, ApiError, AppState};

#[derive(Deserialize)]
struct CreateBoard {
    name: String,
}

#[derive(Serialize)]
struct CreatedBoard {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct UpdateBoard {
    id: String,
    name: String,
    #[serde(default)]
    members: Option<Vec<String>>,
}

/// POST /team/board
pub async fn create(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_create(app, event).await)
}

async fn try_create(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Admin)?;
    let mut state = read_state(&app.state_codec, cookie_header.as_deref())?;

    // Storage re-checks this against the fresh team row.
    if state.boards.len() >= MAX_BOARDS {
        return Err(ApiError::bad_request(messages::MAX_BOARDS));
    }

    let body: CreateBoard = parse_body(event)?;
    check(validate::board_name(&body.name))?;

    let inserted = with_fresh_id(app.ids.as_ref(), "board", |board_id| {
        let board = TeamBoard {
            id: board_id.clone(),
            name: body.name.clone(),
            members: vec![claims.username.clone()],
        };
        let store = app.teams.as_ref();
        let team_id = claims.team_id.as_str();
        async move {
            teams::insert_board(store, team_id, board)
                .await
                .map(|_| board_id)
        }
    })
    .await;

    let board_id = match inserted {
        Ok(id) => id,
        Err(StorageError::NoItem) => return Err(ApiError::not_found(messages::TEAM_NOT_FOUND)),
        Err(e) => return Err(ApiError::storage("insert board", e)),
    };
    tracing::info!("created board {} in team {}", board_id, claims.team_id);

    state.push_board(board_id.clone());
    let set_cookies = vec![state_cookie(app, &state)?];

    let created = CreatedBoard {
        id: board_id,
        name: body.name,
    };
    response::json(StatusCode::OK, &created, &set_cookies)
}

/// PATCH /team/board
///
/// Renames a board and optionally replaces its member list. The layout is
/// unchanged so no new state token is issued.
pub async fn update(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_update(app, event).await)
}

async fn try_update(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Admin)?;
    let state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let body: UpdateBoard = parse_body(event)?;
    if state.locate_board(&body.id).is_none() {
        tracing::warn!("board {} not in state of {}", body.id, claims.username);
        return Err(ApiError::bad_request(messages::INVALID_BOARD_ID));
    }
    check(validate::board_name(&body.name))?;
    if let Some(members) = &body.members {
        for member in members {
            check(validate::username(member))?;
        }
    }

    match teams::update_board(
        app.teams.as_ref(),
        &claims.team_id,
        &body.id,
        &body.name,
        body.members.as_deref(),
    )
    .await
    {
        Ok(_) => {}
        Err(StorageError::NoItem) => return Err(ApiError::not_found(messages::BOARD_NOT_FOUND)),
        Err(StorageError::NotTeamMember(name)) => {
            tracing::warn!("{} is not in team {}", name, claims.team_id);
            return Err(ApiError::bad_request(messages::INVALID_BOARD_MEMBERS));
        }
        Err(e) => return Err(ApiError::storage("update board", e)),
    }
    tracing::info!("updated board {} in team {}", body.id, claims.team_id);

    response::ok(&[])
}

/// DELETE /team/board?id=
///
/// Deletes the board's tasks, then removes the board from the team row.
pub async fn delete(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_delete(app, event).await)
}

async fn try_delete(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Admin)?;
    let mut state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let board_id = query_param(event, "id").unwrap_or_default();
    let Some(idx) = state.locate_board(&board_id) else {
        tracing::warn!("board {:?} not in state of {}", board_id, claims.username);
        return Err(ApiError::bad_request(messages::INVALID_BOARD_ID));
    };

    // A failed team write below leaves the board in place for a retry.
    let removed = app
        .tasks
        .delete_by_board(&claims.team_id, &board_id)
        .await
        .map_err(|e| ApiError::storage("delete board tasks", e))?;

    match teams::delete_board(app.teams.as_ref(), &claims.team_id, &board_id).await {
        Ok(_) => {}
        Err(StorageError::NoItem) => return Err(ApiError::not_found(messages::BOARD_NOT_FOUND)),
        Err(e) => return Err(ApiError::storage("delete board", e)),
    }
    tracing::info!(
        "deleted board {} and {} task(s) from team {}",
        board_id,
        removed,
        claims.team_id
    );

    state.remove_board(idx);
    let set_cookies = vec![state_cookie(app, &state)?];

    response::ok(&set_cookies)
}

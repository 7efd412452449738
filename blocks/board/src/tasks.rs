use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::Deserialize;
use std::collections::HashSet;

use crate::support::{parse_body, query_param, state_cookie};
use taskboard_atoms::tasks::{COLUMN_COUNT, MAX_ORDER};
use taskboard_atoms::StorageError;
use taskboard_shared::auth::{authorize, cookies, read_state, Role, StateBoard};
use taskboard_shared::error::respond;
use taskboard_shared::{messages, response, ApiError, AppState};

#[derive(Deserialize)]
struct MoveTasks {
    board: String,
    tasks: Vec<TaskPosition>,
}

#[derive(Deserialize)]
struct TaskPosition {
    id: String,
    column: usize,
    order: i64,
}

/// GET /tasks?boardID=
///
/// Lists a board's tasks sorted by column then order and replaces that
/// board's layout in the state token with what storage holds.
pub async fn list(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_list(app, event).await)
}

async fn try_list(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Member)?;
    let mut state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let board_id = query_param(event, "boardID").unwrap_or_default();
    let Some(idx) = state.locate_board(&board_id) else {
        tracing::warn!("board {:?} not in state of {}", board_id, claims.username);
        return Err(ApiError::bad_request(messages::INVALID_BOARD_ID));
    };

    let mut tasks = app
        .tasks
        .list_by_board(&board_id)
        .await
        .map_err(|e| ApiError::storage("list board tasks", e))?;
    tasks.retain(|t| t.team_id == claims.team_id);
    tasks.sort_by_key(|t| (t.column, t.order));

    state.boards[idx] = StateBoard::from_tasks(board_id, &tasks);
    let set_cookies = vec![state_cookie(app, &state)?];

    response::json(StatusCode::OK, &tasks, &set_cookies)
}

/// PATCH /tasks
///
/// Moves and reorders tasks within one board. Every position is checked
/// against the state token before anything is written.
pub async fn reorder(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_reorder(app, event).await)
}

async fn try_reorder(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Member)?;
    let mut state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let body: MoveTasks = parse_body(event)?;
    let Some(board) = state.locate_board(&body.board) else {
        tracing::warn!("board {} not in state of {}", body.board, claims.username);
        return Err(ApiError::bad_request(messages::INVALID_BOARD_ID));
    };

    let mut seen = HashSet::new();
    for position in &body.tasks {
        if position.column >= COLUMN_COUNT {
            return Err(ApiError::bad_request(messages::INVALID_COLUMN));
        }
        if !(0..=MAX_ORDER).contains(&position.order) {
            return Err(ApiError::bad_request(messages::INVALID_ORDER));
        }
        let on_board = state
            .locate_task(&position.id)
            .is_some_and(|loc| loc.board == board);
        if !on_board || !seen.insert(position.id.as_str()) {
            tracing::warn!(
                "task {} not on board {} in state of {}",
                position.id,
                body.board,
                claims.username
            );
            return Err(ApiError::bad_request(messages::INVALID_TASK_ID));
        }
    }

    // Writes are per task; a failure part way leaves earlier moves committed
    // and the state token unchanged, which GET /tasks repairs.
    for position in &body.tasks {
        match app
            .tasks
            .set_position(&claims.team_id, &position.id, position.column, position.order)
            .await
        {
            Ok(()) => {}
            Err(StorageError::NoItem) => {
                return Err(ApiError::not_found(messages::TASK_NOT_FOUND))
            }
            Err(e) => return Err(ApiError::storage("move task", e)),
        }
    }
    tracing::info!("moved {} task(s) on board {}", body.tasks.len(), body.board);

    for position in &body.tasks {
        if let Some(loc) = state.locate_task(&position.id) {
            state.move_task(loc, position.column, position.order);
        }
    }
    let set_cookies = vec![state_cookie(app, &state)?];

    response::ok(&set_cookies)
}

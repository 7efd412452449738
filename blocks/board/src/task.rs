use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};

use crate::support::{check, parse_body, query_param, state_cookie, with_fresh_id};
use taskboard_atoms::tasks::{Subtask, Task, TaskContent, COLUMN_COUNT};
use taskboard_atoms::StorageError;
use taskboard_shared::auth::{authorize, cookies, read_state, validate, Role, StateTask};
use taskboard_shared::error::respond;
use taskboard_shared::{messages, response, ApiError, AppState};

#[derive(Deserialize)]
struct CreateTask {
    board: String,
    column: usize,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    subtasks: Vec<Subtask>,
}

#[derive(Serialize)]
struct CreatedTask {
    id: String,
    order: i64,
}

fn validate_content(title: &str, description: &str, subtasks: &[Subtask]) -> Result<(), ApiError> {
    check(validate::task_title(title))?;
    check(validate::task_description(description))?;
    check(validate::subtasks(subtasks))
}

/// POST /task
///
/// Appends a task to the bottom of a column. The board must be one the
/// caller's state token knows about.
pub async fn create(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_create(app, event).await)
}

async fn try_create(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Admin)?;
    let mut state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let body: CreateTask = parse_body(event)?;
    let Some(board) = state.locate_board(&body.board) else {
        tracing::warn!("board {} not in state of {}", body.board, claims.username);
        return Err(ApiError::forbidden(messages::NO_BOARD_ACCESS));
    };
    if body.column >= COLUMN_COUNT {
        return Err(ApiError::bad_request(messages::INVALID_COLUMN));
    }
    let Some(order) = state.next_order(board, body.column) else {
        tracing::warn!("column {} of board {} has no order left", body.column, body.board);
        return Err(ApiError::bad_request(messages::INVALID_ORDER));
    };
    validate_content(&body.title, &body.description, &body.subtasks)?;

    let inserted = with_fresh_id(app.ids.as_ref(), "task", |task_id| {
        let task = Task {
            team_id: claims.team_id.clone(),
            board_id: body.board.clone(),
            column: body.column,
            id: task_id,
            title: body.title.clone(),
            description: body.description.clone(),
            order,
            subtasks: body.subtasks.clone(),
        };
        let store = app.tasks.as_ref();
        async move { store.insert(&task).await.map(|()| task.id) }
    })
    .await;

    let task_id = inserted.map_err(|e| ApiError::storage("insert task", e))?;
    tracing::info!(
        "created task {} on board {} column {} order {}",
        task_id,
        body.board,
        body.column,
        order
    );

    state.push_task(
        board,
        body.column,
        StateTask {
            id: task_id.clone(),
            order,
        },
    );
    let set_cookies = vec![state_cookie(app, &state)?];

    let created = CreatedTask { id: task_id, order };
    response::json(StatusCode::OK, &created, &set_cookies)
}

/// PATCH /task?id=
pub async fn update(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_update(app, event).await)
}

async fn try_update(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Admin)?;
    let state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let task_id = query_param(event, "id").unwrap_or_default();
    if state.locate_task(&task_id).is_none() {
        tracing::warn!("task {:?} not in state of {}", task_id, claims.username);
        return Err(ApiError::bad_request(messages::INVALID_TASK_ID));
    }

    let content: TaskContent = parse_body(event)?;
    validate_content(&content.title, &content.description, &content.subtasks)?;

    match app.tasks.update(&claims.team_id, &task_id, &content).await {
        Ok(()) => {}
        Err(StorageError::NoItem) => return Err(ApiError::not_found(messages::TASK_NOT_FOUND)),
        Err(e) => return Err(ApiError::storage("update task", e)),
    }
    tracing::info!("updated task {}", task_id);

    response::ok(&[])
}

/// DELETE /task?id=
pub async fn delete(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_delete(app, event).await)
}

async fn try_delete(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Admin)?;
    let mut state = read_state(&app.state_codec, cookie_header.as_deref())?;

    let task_id = query_param(event, "id").unwrap_or_default();
    let Some(loc) = state.locate_task(&task_id) else {
        tracing::warn!("task {:?} not in state of {}", task_id, claims.username);
        return Err(ApiError::bad_request(messages::INVALID_TASK_ID));
    };

    match app.tasks.delete(&claims.team_id, &task_id).await {
        Ok(()) => {}
        Err(StorageError::NoItem) => return Err(ApiError::not_found(messages::TASK_NOT_FOUND)),
        Err(e) => return Err(ApiError::storage("delete task", e)),
    }
    tracing::info!("deleted task {}", task_id);

    state.remove_task(loc);
    let set_cookies = vec![state_cookie(app, &state)?];

    response::ok(&set_cookies)
}

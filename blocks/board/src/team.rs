use futures::future::try_join_all;
use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::Serialize;

use crate::support::{invite_cookie, state_cookie};
use taskboard_atoms::tasks::TaskStore;
use taskboard_atoms::teams::{self, Team, TeamBoard};
use taskboard_atoms::StorageError;
use taskboard_shared::auth::{authorize, cookies, AuthClaims, InviteClaims, Role, StateBoard, StateClaims};
use taskboard_shared::error::respond;
use taskboard_shared::{messages, response, ApiError, AppState};

#[derive(Serialize)]
struct TeamView<'a> {
    id: &'a str,
    members: &'a [String],
    boards: Vec<&'a TeamBoard>,
}

/// GET /team
///
/// Returns the caller's team and the boards visible to them, and issues a
/// fresh state token describing those boards. The admin's first call creates
/// the team row; a member's first call adds them to `members`.
pub async fn get(app: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    respond(try_get(app, event).await)
}

async fn try_get(app: &AppState, event: &Request) -> Result<Response<Body>, ApiError> {
    let cookie_header = cookies::cookie_header(event);
    let claims = authorize(&app.auth_codec, cookie_header.as_deref(), Role::Member)?;

    let team = load_team(app, &claims).await?;

    let boards: Vec<&TeamBoard> = team
        .boards
        .iter()
        .filter(|b| claims.is_admin || b.has_member(&claims.username))
        .collect();

    let state = StateClaims {
        boards: try_join_all(
            boards
                .iter()
                .map(|b| board_layout(app.tasks.as_ref(), &team.id, &b.id)),
        )
        .await
        .map_err(|e| ApiError::storage("read board layouts", e))?,
    };

    let mut set_cookies = vec![state_cookie(app, &state)?];
    if claims.is_admin {
        let invite = InviteClaims {
            team_id: team.id.clone(),
        };
        set_cookies.push(invite_cookie(app, &invite)?);
    }

    let view = TeamView {
        id: &team.id,
        members: &team.members,
        boards,
    };
    response::json(StatusCode::OK, &view, &set_cookies)
}

async fn load_team(app: &AppState, claims: &AuthClaims) -> Result<Team, ApiError> {
    match app.teams.get(&claims.team_id).await {
        Ok(team) if claims.is_admin || team.has_member(&claims.username) => Ok(team),
        Ok(_) => {
            let team = teams::add_member(app.teams.as_ref(), &claims.team_id, &claims.username)
                .await
                .map_err(|e| ApiError::storage("add team member", e))?;
            tracing::info!("{} joined team {}", claims.username, team.id);
            Ok(team)
        }
        Err(StorageError::NoItem) if claims.is_admin => create_team(app, claims).await,
        Err(StorageError::NoItem) => Err(ApiError::not_found(messages::TEAM_NOT_FOUND)),
        Err(e) => Err(ApiError::storage("get team", e)),
    }
}

async fn create_team(app: &AppState, claims: &AuthClaims) -> Result<Team, ApiError> {
    let team = Team::new(&claims.team_id, &claims.username, &app.ids.next_id());

    // The insert is conditional on the team key alone, so a duplicate means
    // another request created the row first.
    match app.teams.insert(&team).await {
        Ok(()) => {
            tracing::info!("created team {} for {}", team.id, claims.username);
            Ok(team)
        }
        Err(StorageError::DupKey) => {
            tracing::info!("team {} was created concurrently, re-reading", team.id);
            app.teams
                .get(&claims.team_id)
                .await
                .map_err(|e| ApiError::storage("get team after insert race", e))
        }
        Err(e) => Err(ApiError::storage("insert team", e)),
    }
}

/// A board's layout as stored, restricted to tasks owned by the team.
pub(crate) async fn board_layout(
    tasks: &dyn TaskStore,
    team_id: &str,
    board_id: &str,
) -> Result<StateBoard, StorageError> {
    let mut stored = tasks.list_by_board(board_id).await?;
    stored.retain(|t| t.team_id == team_id);
    Ok(StateBoard::from_tasks(board_id, &stored))
}

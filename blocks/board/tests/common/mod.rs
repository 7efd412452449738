#![allow(dead_code)]

use chrono::Duration;
use lambda_http::http::header::{COOKIE, SET_COOKIE};
use lambda_http::http::Method;
use lambda_http::{Body, Request, RequestExt, Response};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use taskboard_atoms::memory::{MemoryTaskStore, MemoryTeamStore, MemoryUserStore};
use taskboard_atoms::tasks::Task;
use taskboard_atoms::teams::{Team, TeamBoard};
use taskboard_shared::auth::{
    cookies, AuthClaims, HashError, Hasher, IdGenerator, InviteClaims, StateBoard, StateClaims,
    StateTask,
};
use taskboard_shared::config::AppConfig;
use taskboard_shared::AppState;

pub const TEAM: &str = "team-1";
pub const ADMIN: &str = "alice01";
pub const MEMBER: &str = "bobby02";
pub const PASSWORD: &str = "Myp4ssword!";

/// Hands out scripted IDs first, then `id-1`, `id-2`, ...
#[derive(Default)]
pub struct ScriptedIds {
    script: Mutex<VecDeque<String>>,
    counter: Mutex<usize>,
}

impl ScriptedIds {
    pub fn push(&self, ids: &[&str]) {
        self.script
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
    }
}

impl IdGenerator for ScriptedIds {
    fn next_id(&self) -> String {
        if let Some(id) = self.script.lock().unwrap().pop_front() {
            return id;
        }
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        format!("id-{}", counter)
    }
}

/// Stores the password reversed. Enough to tell hashes from plaintext.
pub struct ReversingHasher;

impl Hasher for ReversingHasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        Ok(password.chars().rev().collect())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        Ok(password.chars().rev().collect::<String>() == hash)
    }
}

pub struct Harness {
    pub app: AppState,
    pub users: Arc<MemoryUserStore>,
    pub teams: Arc<MemoryTeamStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub ids: Arc<ScriptedIds>,
}

impl Harness {
    pub fn new() -> Self {
        let config = AppConfig {
            jwt_key: "integration-test-key".to_string(),
            ..AppConfig::default()
        };
        let users = Arc::new(MemoryUserStore::new());
        let teams = Arc::new(MemoryTeamStore::new());
        let tasks = Arc::new(MemoryTaskStore::new());
        let ids = Arc::new(ScriptedIds::default());
        let app = AppState::new(
            config,
            users.clone(),
            teams.clone(),
            tasks.clone(),
            Arc::new(ReversingHasher),
            ids.clone(),
        );
        Self {
            app,
            users,
            teams,
            tasks,
            ids,
        }
    }

    pub fn auth(&self, username: &str, is_admin: bool) -> String {
        let claims = AuthClaims {
            username: username.to_string(),
            is_admin,
            team_id: TEAM.to_string(),
        };
        let token = self.app.auth_codec.encode(&claims, Duration::hours(1)).unwrap();
        format!("{}={}", cookies::AUTH_TOKEN, token)
    }

    pub fn admin(&self) -> String {
        self.auth(ADMIN, true)
    }

    pub fn member(&self) -> String {
        self.auth(MEMBER, false)
    }

    pub fn state(&self, state: &StateClaims) -> String {
        let token = self.app.state_codec.encode(state, Duration::hours(1)).unwrap();
        format!("{}={}", cookies::STATE_TOKEN, token)
    }

    pub fn invite(&self, team_id: &str) -> String {
        let claims = InviteClaims {
            team_id: team_id.to_string(),
        };
        let token = self.app.invite_codec.encode(&claims, Duration::hours(1)).unwrap();
        format!("{}={}", cookies::INVITE_TOKEN, token)
    }

    /// The state token set by `resp`, decoded.
    pub fn issued_state(&self, resp: &Response<Body>) -> StateClaims {
        let token = set_cookie(resp, cookies::STATE_TOKEN).expect("state-token not set");
        self.app.state_codec.decode(&token).unwrap()
    }

    pub fn issued_auth(&self, resp: &Response<Body>) -> AuthClaims {
        let token = set_cookie(resp, cookies::AUTH_TOKEN).expect("auth-token not set");
        self.app.auth_codec.decode(&token).unwrap()
    }

    /// Seed a team owned by ADMIN with the given boards, each shared with MEMBER.
    pub fn seed_team(&self, board_ids: &[&str]) {
        self.teams.seed(Team {
            id: TEAM.to_string(),
            members: vec![ADMIN.to_string(), MEMBER.to_string()],
            boards: board_ids
                .iter()
                .map(|id| TeamBoard {
                    id: id.to_string(),
                    name: format!("Board {}", id),
                    members: vec![ADMIN.to_string(), MEMBER.to_string()],
                })
                .collect(),
            version: 1,
        });
    }
}

pub fn request(
    method: Method,
    path: &str,
    query: &[(&str, &str)],
    cookies: &[String],
    body: Option<serde_json::Value>,
) -> Request {
    let mut builder = lambda_http::http::Request::builder().method(method).uri(path);
    if !cookies.is_empty() {
        builder = builder.header(COOKIE, cookies.join("; "));
    }
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::Empty,
    };
    let params: HashMap<String, String> = query
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    builder
        .body(body)
        .unwrap()
        .with_query_string_parameters(params)
}

/// Value of the `Set-Cookie` named `name`, if the response set one.
pub fn set_cookie(resp: &Response<Body>, name: &str) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

pub fn body_json(resp: &Response<Body>) -> serde_json::Value {
    serde_json::from_slice(resp.body()).unwrap()
}

pub fn error_message(resp: &Response<Body>) -> String {
    body_json(resp)["error"].as_str().unwrap_or_default().to_string()
}

pub fn stored_task(board: &str, id: &str, column: usize, order: i64) -> Task {
    Task {
        team_id: TEAM.to_string(),
        board_id: board.to_string(),
        column,
        id: id.to_string(),
        title: format!("Task {}", id),
        description: String::new(),
        order,
        subtasks: vec![],
    }
}

/// A state with one board per `(id, tasks)` entry, tasks given as
/// `(task_id, column, order)`.
pub fn state_of(boards: &[(&str, Vec<(&str, usize, i64)>)]) -> StateClaims {
    StateClaims {
        boards: boards
            .iter()
            .map(|(id, tasks)| {
                let mut board = StateBoard::new(*id);
                for (task_id, column, order) in tasks.iter() {
                    board.columns[*column].tasks.push(StateTask {
                        id: task_id.to_string(),
                        order: *order,
                    });
                }
                board
            })
            .collect(),
    }
}

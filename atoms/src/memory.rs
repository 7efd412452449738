//! In-memory stores with the same conditional semantics as the DynamoDB ones.
//! They count calls so tests can assert whether storage was touched.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::storage::StorageError;
use crate::tasks::{Task, TaskContent, TaskStore};
use crate::teams::{Team, TeamStore};
use crate::users::{User, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StorageError> {
        let mut users = self.users.lock();
        if users.contains_key(&user.username) {
            return Err(StorageError::DupKey);
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<User, StorageError> {
        self.users
            .lock()
            .get(username)
            .cloned()
            .ok_or(StorageError::NoItem)
    }
}

#[derive(Default)]
pub struct MemoryTeamStore {
    teams: Mutex<HashMap<String, Team>>,
    /// Number of upcoming `replace` calls that lose to a simulated
    /// concurrent writer.
    interfering_writes: AtomicUsize,
    replaces: AtomicUsize,
    /// Row written by a simulated concurrent creator just before the next
    /// `insert` of the same team.
    racing_insert: Mutex<Option<Team>>,
    inserts: AtomicUsize,
}

impl MemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a team as-is, bypassing the insert condition.
    pub fn seed(&self, team: Team) {
        self.teams.lock().insert(team.id.clone(), team);
    }

    /// Make the next `n` replaces fail as if another request wrote first.
    pub fn interfere_with_next_replaces(&self, n: usize) {
        self.interfering_writes.store(n, Ordering::SeqCst);
    }

    /// Make the next insert of `team.id` find `team` already stored.
    pub fn lose_next_insert_to(&self, team: Team) {
        *self.racing_insert.lock() = Some(team);
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn replace_calls(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, team_id: &str) -> Option<Team> {
        self.teams.lock().get(team_id).cloned()
    }
}

#[async_trait]
impl TeamStore for MemoryTeamStore {
    async fn get(&self, team_id: &str) -> Result<Team, StorageError> {
        self.teams
            .lock()
            .get(team_id)
            .cloned()
            .ok_or(StorageError::NoItem)
    }

    async fn insert(&self, team: &Team) -> Result<(), StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut teams = self.teams.lock();
        if let Some(winner) = self.racing_insert.lock().take() {
            teams.insert(winner.id.clone(), winner);
        }
        if teams.contains_key(&team.id) {
            return Err(StorageError::DupKey);
        }
        teams.insert(team.id.clone(), team.clone());
        Ok(())
    }

    async fn replace(&self, team: &Team, expected: u64) -> Result<(), StorageError> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        let mut teams = self.teams.lock();
        let stored = teams.get_mut(&team.id).ok_or(StorageError::Conflict)?;

        let interfering = self.interfering_writes.load(Ordering::SeqCst);
        if interfering > 0 {
            self.interfering_writes.store(interfering - 1, Ordering::SeqCst);
            stored.version += 1;
            return Err(StorageError::Conflict);
        }

        if stored.version != expected {
            return Err(StorageError::Conflict);
        }
        *stored = team.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<HashMap<(String, String), Task>>,
    writes: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task as-is, bypassing the insert condition and the write count.
    pub fn seed(&self, task: Task) {
        self.tasks
            .lock()
            .insert((task.team_id.clone(), task.id.clone()), task);
    }

    /// Number of mutating calls made so far, successful or not.
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, team_id: &str, task_id: &str) -> Option<Task> {
        self.tasks
            .lock()
            .get(&(team_id.to_string(), task_id.to_string()))
            .cloned()
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> Result<(), StorageError> {
        self.write();
        let mut tasks = self.tasks.lock();
        let key = (task.team_id.clone(), task.id.clone());
        if tasks.contains_key(&key) {
            return Err(StorageError::DupKey);
        }
        tasks.insert(key, task.clone());
        Ok(())
    }

    async fn update(
        &self,
        team_id: &str,
        task_id: &str,
        content: &TaskContent,
    ) -> Result<(), StorageError> {
        self.write();
        let mut tasks = self.tasks.lock();
        let task = tasks
            .get_mut(&(team_id.to_string(), task_id.to_string()))
            .ok_or(StorageError::NoItem)?;
        task.title = content.title.clone();
        task.description = content.description.clone();
        task.subtasks = content.subtasks.clone();
        Ok(())
    }

    async fn set_position(
        &self,
        team_id: &str,
        task_id: &str,
        column: usize,
        order: i64,
    ) -> Result<(), StorageError> {
        self.write();
        let mut tasks = self.tasks.lock();
        let task = tasks
            .get_mut(&(team_id.to_string(), task_id.to_string()))
            .ok_or(StorageError::NoItem)?;
        task.column = column;
        task.order = order;
        Ok(())
    }

    async fn delete(&self, team_id: &str, task_id: &str) -> Result<(), StorageError> {
        self.write();
        self.tasks
            .lock()
            .remove(&(team_id.to_string(), task_id.to_string()))
            .map(|_| ())
            .ok_or(StorageError::NoItem)
    }

    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Task>, StorageError> {
        Ok(self
            .tasks
            .lock()
            .values()
            .filter(|t| t.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn delete_by_board(&self, team_id: &str, board_id: &str) -> Result<usize, StorageError> {
        self.write();
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|_, t| !(t.team_id == team_id && t.board_id == board_id));
        Ok(before - tasks.len())
    }
}

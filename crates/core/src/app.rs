//! Explicitly owned application state: the session controller plus, while signed in,
//! the task board for that session.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::board::{TaskBoard, TaskError};
use crate::endpoints::Endpoints;
use crate::model::{Criterion, SortKey, Task, TaskDraft, TaskId, TaskPatch, TaskStats};
use crate::services::TasksService;
use crate::session::{ActiveView, AuthError, Credentials, Session, SessionController};
use crate::storage::SessionStorage;

pub struct AppState {
    session: SessionController,
    service: TasksService,
    board: Option<TaskBoard>,
}

impl AppState {
    /// Restores any persisted session; a restored session starts with an empty board.
    pub fn new(client: Arc<dyn ApiClient>, endpoints: Endpoints, storage: SessionStorage) -> Self {
        let service = TasksService::new(client.clone(), endpoints.clone());
        let session = SessionController::restore(client, endpoints, storage);
        let board = session
            .is_authenticated()
            .then(|| TaskBoard::new(service.clone()));
        Self {
            session,
            service,
            board,
        }
    }

    pub fn active_view(&self) -> ActiveView {
        self.session.active_view()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    /// Signs in or up and starts a fresh board. On failure the previous state is kept.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<Session, AuthError> {
        let session = self.session.submit(credentials).await?;
        self.board = Some(TaskBoard::new(self.service.clone()));
        Ok(session)
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.board = None;
    }

    pub fn dashboard(&mut self) -> Result<Dashboard<'_>, AuthError> {
        let token = match self.session.session() {
            Some(session) => session.token.as_str(),
            None => return Err(AuthError::NotAuthenticated),
        };
        let board = self
            .board
            .get_or_insert_with(|| TaskBoard::new(self.service.clone()));
        Ok(Dashboard { board, token })
    }
}

/// The board paired with the active session's token.
pub struct Dashboard<'a> {
    board: &'a mut TaskBoard,
    token: &'a str,
}

impl<'a> Dashboard<'a> {
    pub fn board(&self) -> &TaskBoard {
        &*self.board
    }

    pub async fn load(&mut self) -> Result<&[Task], TaskError> {
        self.board.load(self.token).await
    }

    pub async fn add(&mut self, draft: &TaskDraft) -> Result<Task, TaskError> {
        self.board.add(draft, self.token).await
    }

    pub async fn update(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<Task, TaskError> {
        self.board.update(id, patch, self.token).await
    }

    pub async fn toggle(&mut self, id: &TaskId) -> Result<Task, TaskError> {
        let task = self
            .board
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        self.board.toggle_completion(&task, self.token).await
    }

    pub async fn remove(&mut self, id: &TaskId) -> Result<(), TaskError> {
        self.board.remove(id, self.token).await
    }

    pub fn resolve_id(&self, prefix: &str) -> Result<TaskId, TaskError> {
        self.board.resolve_id(prefix)
    }

    pub fn visible(&self, criterion: Criterion, key: SortKey, today: NaiveDate) -> Vec<Task> {
        self.board.visible(criterion, key, today)
    }

    pub fn stats(&self) -> TaskStats {
        self.board.stats()
    }
}

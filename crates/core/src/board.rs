//! The task view-model: the authoritative in-memory list for the active session.
//!
//! Every mutation performs exactly one round-trip through [`TasksService`] and only touches
//! the local list after the server has confirmed it. A failed call leaves the list as it was.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::api::RequestError;
use crate::model::{Criterion, SortKey, Task, TaskDraft, TaskId, TaskPatch, TaskStats};
use crate::services::TasksService;
use crate::validation::ValidationError;
use crate::views;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Task not found: {0}")]
    NotFound(TaskId),
    #[error("Task id '{0}' is ambiguous")]
    Ambiguous(String),
}

#[derive(Debug)]
pub struct TaskBoard {
    service: TasksService,
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(service: TasksService) -> Self {
        Self {
            service,
            tasks: Vec::new(),
        }
    }

    /// Current list, newest first unless a mutation replaced an entry in place.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Exact id match first, then a unique prefix.
    pub fn resolve_id(&self, prefix: &str) -> Result<TaskId, TaskError> {
        let prefix = prefix.trim();
        if let Some(task) = self.tasks.iter().find(|task| task.id.as_str() == prefix) {
            return Ok(task.id.clone());
        }
        let mut matches = self
            .tasks
            .iter()
            .filter(|task| !prefix.is_empty() && task.id.as_str().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(TaskError::Ambiguous(prefix.to_string())),
            _ => Err(TaskError::NotFound(TaskId::new(prefix))),
        }
    }

    pub async fn load(&mut self, token: &str) -> Result<&[Task], TaskError> {
        let fetched = self.service.list_tasks(token).await.map_err(|err| {
            warn!(error = %err, "loading tasks failed; keeping the previous list");
            err
        })?;
        self.tasks = views::sort(&fetched, SortKey::CreatedDesc);
        debug!(count = self.tasks.len(), "tasks loaded");
        Ok(&self.tasks)
    }

    pub async fn add(&mut self, draft: &TaskDraft, token: &str) -> Result<Task, TaskError> {
        draft.validate()?;
        let created = self.service.create_task(draft, token).await?;
        self.tasks.push(created.clone());
        self.tasks = views::sort(&self.tasks, SortKey::CreatedDesc);
        Ok(created)
    }

    /// Sends the full merged record; the server's answer replaces the entry in place.
    pub async fn update(
        &mut self,
        id: &TaskId,
        patch: &TaskPatch,
        token: &str,
    ) -> Result<Task, TaskError> {
        patch.validate()?;
        let current = self
            .get(id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        let merged = current.merged(patch);
        let updated = self.service.update_task(id, &merged, token).await?;
        self.replace(id, updated.clone());
        Ok(updated)
    }

    pub async fn toggle_completion(&mut self, task: &Task, token: &str) -> Result<Task, TaskError> {
        let updated = self.service.toggle_completion(task, token).await?;
        self.replace(&task.id, updated.clone());
        Ok(updated)
    }

    pub async fn remove(&mut self, id: &TaskId, token: &str) -> Result<(), TaskError> {
        self.service.delete_task(id, token).await?;
        self.tasks.retain(|task| &task.id != id);
        Ok(())
    }

    /// Tasks matching `criterion`, ordered by `key`.
    pub fn visible(&self, criterion: Criterion, key: SortKey, today: NaiveDate) -> Vec<Task> {
        views::filter(&views::sort(&self.tasks, key), criterion, today)
    }

    pub fn stats(&self) -> TaskStats {
        views::stats(&self.tasks)
    }

    fn replace(&mut self, id: &TaskId, task: Task) {
        match self.tasks.iter_mut().find(|entry| &entry.id == id) {
            Some(entry) => *entry = task,
            None => debug!(id = id.as_str(), "updated task is no longer in the list"),
        }
    }
}

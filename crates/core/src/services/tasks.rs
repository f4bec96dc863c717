use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{decode, encode, ApiClient, RequestError};
use crate::endpoints::Endpoints;
use crate::model::{Task, TaskDraft, TaskId};

#[derive(Serialize)]
struct CreateTaskBody<'a> {
    #[serde(flatten)]
    draft: &'a TaskDraft,
    #[serde(rename = "isComplete")]
    completed: bool,
}

/// Maps task CRUD intents onto the remote task endpoints.
#[derive(Clone)]
pub struct TasksService {
    client: Arc<dyn ApiClient>,
    endpoints: Endpoints,
}

impl fmt::Debug for TasksService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TasksService")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl TasksService {
    pub fn new(client: Arc<dyn ApiClient>, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, RequestError> {
        let url = self.endpoints.tasks();
        let body = self.client.get(&url, token).await?;
        decode(&url, body)
    }

    pub async fn get_task(&self, id: &TaskId, token: &str) -> Result<Task, RequestError> {
        let url = self.endpoints.task(id);
        let body = self.client.get(&url, token).await?;
        decode(&url, body)
    }

    /// New tasks always start incomplete.
    pub async fn create_task(&self, draft: &TaskDraft, token: &str) -> Result<Task, RequestError> {
        let url = self.endpoints.tasks();
        let payload = encode(&CreateTaskBody {
            draft,
            completed: false,
        })?;
        let body = self.client.post(&url, payload, Some(token)).await?;
        decode(&url, body)
    }

    pub async fn update_task(
        &self,
        id: &TaskId,
        task: &Task,
        token: &str,
    ) -> Result<Task, RequestError> {
        let url = self.endpoints.task(id);
        let body = self.client.put(&url, encode(task)?, token).await?;
        decode(&url, body)
    }

    pub async fn delete_task(&self, id: &TaskId, token: &str) -> Result<(), RequestError> {
        let url = self.endpoints.task(id);
        self.client.delete(&url, token).await?;
        Ok(())
    }

    pub async fn toggle_completion(&self, task: &Task, token: &str) -> Result<Task, RequestError> {
        self.update_task(&task.id, &task.toggled(), token).await
    }
}

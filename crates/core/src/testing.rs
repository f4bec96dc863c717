//! In-memory stand-ins for the remote API, shared by this crate's tests and the CLI's.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{ApiClient, ApiRequest, Method, RequestError};
use crate::endpoints::Endpoints;
use crate::model::{Task, TaskDraft, TaskId};

pub const TEST_TOKEN: &str = "test-token";

const FAKE_BASE_URL: &str = "http://fake.test";

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A pending task titled after its id, created `created_minutes` after a fixed epoch.
pub fn task_fixture(id: &str, created_minutes: i64) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("Task {}", id),
        description: None,
        color: Default::default(),
        due_date: None,
        priority: Default::default(),
        completed: false,
        created_at: epoch() + Duration::minutes(created_minutes),
    }
}

#[derive(Debug, Clone)]
struct Account {
    name: String,
    password: String,
}

#[derive(Debug, Default)]
struct ServerState {
    tasks: Vec<Task>,
    accounts: BTreeMap<String, Account>,
    requests: Vec<ApiRequest>,
    next_id: u64,
    failing: bool,
    failing_paths: Vec<String>,
}

/// Fake task API: assigns ids and creation times, echoes PUT bodies and records every request.
#[derive(Debug)]
pub struct FakeServer {
    endpoints: Endpoints,
    state: Mutex<ServerState>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            endpoints: Endpoints::new(FAKE_BASE_URL),
            state: Mutex::new(ServerState::default()),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        self.endpoints.clone()
    }

    pub fn seed(&self, tasks: Vec<Task>) {
        self.state.lock().tasks = tasks;
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    /// Every request answers HTTP 500 while set.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Requests whose path ends with `suffix` answer HTTP 500.
    pub fn fail_path(&self, suffix: &str) {
        self.state.lock().failing_paths.push(suffix.to_string());
    }

    pub fn register_user(&self, name: &str, email: &str, password: &str) {
        self.state.lock().accounts.insert(
            email.to_string(),
            Account {
                name: name.to_string(),
                password: password.to_string(),
            },
        );
    }

    fn route(&self, state: &mut ServerState, request: &ApiRequest) -> Result<Option<Value>, u16> {
        let path = request
            .url
            .strip_prefix(self.endpoints.base())
            .unwrap_or(request.url.as_str());
        if state.failing || state.failing_paths.iter().any(|s| path.ends_with(s.as_str())) {
            return Err(500);
        }

        match (request.method, path) {
            (Method::Post, "/auth/register") => register(state, request.body.as_ref()),
            (Method::Post, "/auth/login") => login(state, request.body.as_ref()),
            (Method::Post, "/auth/logout") => Ok(None),
            (method, path) if path == "/task" || path.starts_with("/task/") => {
                if request.token.as_deref().map_or(true, str::is_empty) {
                    return Err(401);
                }
                let id = path.strip_prefix("/task/").map(TaskId::new);
                match (method, id) {
                    (Method::Get, None) => to_body(&state.tasks),
                    (Method::Post, None) => create(state, request.body.as_ref()),
                    (Method::Get, Some(id)) => state
                        .tasks
                        .iter()
                        .find(|t| t.id == id)
                        .ok_or(404)
                        .and_then(to_body),
                    (Method::Put, Some(id)) => update(state, &id, request.body.as_ref()),
                    (Method::Delete, Some(id)) => {
                        let before = state.tasks.len();
                        state.tasks.retain(|t| t.id != id);
                        if state.tasks.len() == before {
                            Err(404)
                        } else {
                            Ok(None)
                        }
                    }
                    _ => Err(405),
                }
            }
            _ => Err(404),
        }
    }
}

fn to_body<T: Serialize>(value: T) -> Result<Option<Value>, u16> {
    serde_json::to_value(value).map(Some).map_err(|_| 500)
}

fn field<'a>(body: Option<&'a Value>, key: &str) -> Option<&'a str> {
    body.and_then(|b| b.get(key)).and_then(Value::as_str)
}

fn issue_token(email: &str) -> String {
    format!("token-{}", email)
}

fn register(state: &mut ServerState, body: Option<&Value>) -> Result<Option<Value>, u16> {
    let (Some(name), Some(email), Some(password)) = (
        field(body, "name"),
        field(body, "email"),
        field(body, "password"),
    ) else {
        return Err(400);
    };
    if state.accounts.contains_key(email) {
        return Err(409);
    }
    state.accounts.insert(
        email.to_string(),
        Account {
            name: name.to_string(),
            password: password.to_string(),
        },
    );
    Ok(Some(json!({ "token": issue_token(email), "userName": name })))
}

fn login(state: &mut ServerState, body: Option<&Value>) -> Result<Option<Value>, u16> {
    let (Some(email), Some(password)) = (field(body, "email"), field(body, "password")) else {
        return Err(400);
    };
    match state.accounts.get(email) {
        Some(account) if account.password == password => Ok(Some(json!({
            "token": issue_token(email),
            "userName": account.name,
        }))),
        _ => Err(401),
    }
}

fn create(state: &mut ServerState, body: Option<&Value>) -> Result<Option<Value>, u16> {
    let body = body.ok_or(400u16)?;
    let draft: TaskDraft = serde_json::from_value(body.clone()).map_err(|_| 400u16)?;
    state.next_id += 1;
    let n = state.next_id;
    let task = Task {
        id: TaskId::new(format!("task-{}", n)),
        title: draft.title,
        description: draft.description,
        color: draft.color,
        due_date: draft.due_date,
        priority: draft.priority,
        completed: body
            .get("isComplete")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        created_at: epoch() + Duration::days(1) + Duration::minutes(n as i64),
    };
    let body = to_body(&task);
    state.tasks.push(task);
    body
}

fn update(state: &mut ServerState, id: &TaskId, body: Option<&Value>) -> Result<Option<Value>, u16> {
    let body = body.ok_or(400u16)?;
    let task: Task = serde_json::from_value(body.clone()).map_err(|_| 400u16)?;
    let entry = state.tasks.iter_mut().find(|t| &t.id == id).ok_or(404u16)?;
    *entry = task;
    Ok(Some(body.clone()))
}

#[async_trait]
impl ApiClient for FakeServer {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, RequestError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        self.route(&mut state, &request)
            .map_err(|status| RequestError::Status {
                method: request.method,
                url: request.url.clone(),
                status,
            })
    }
}

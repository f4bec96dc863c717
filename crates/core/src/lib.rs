pub mod api;
pub mod app;
pub mod board;
pub mod config;
pub mod endpoints;
pub mod model;
pub mod parser;
pub mod services;
pub mod session;
pub mod storage;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod validation;
pub mod views;

pub use api::{ApiClient, HttpClient, RequestError};
pub use app::{AppState, Dashboard};
pub use board::{TaskBoard, TaskError};
pub use config::AppConfig;
pub use endpoints::Endpoints;
pub use model::*;
pub use services::TasksService;
pub use session::{ActiveView, AuthError, Credentials, Session, SessionController, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SessionStorage};
pub use validation::ValidationError;

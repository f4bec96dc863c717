use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

use crate::endpoints::{Endpoints, DEFAULT_API_URL};

static SESSION_FILE_NAME: &str = "session.json";
static ENV_DATA_DIR: &str = "TASKDECK_DATA_DIR";
static ENV_API_URL: &str = "TASKDECK_API_URL";
static ENV_AUTH_SCHEME: &str = "TASKDECK_AUTH_SCHEME";
static DEFAULT_AUTH_SCHEME: &str = "Bearer";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "taskdeck", "taskdeck"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    session_path: PathBuf,
    api_url: String,
    auth_scheme: String,
    request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Resolve the data directory from the override, the environment or platform defaults,
    /// creating it if needed, and pick the API base URL the same way.
    pub fn discover(data_dir_override: Option<PathBuf>, api_url_override: Option<String>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        let config = Self::from_data_dir(data_dir)?;
        Ok(config.with_api_url(resolve_api_url(api_url_override)))
    }

    /// Defaults rooted at an already-resolved data directory.
    pub fn from_data_dir(data_dir: PathBuf) -> Result<Self> {
        let session_path = data_dir.join(SESSION_FILE_NAME);
        Ok(Self {
            data_dir,
            session_path,
            api_url: DEFAULT_API_URL.to_string(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            request_timeout: None,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// An empty scheme sends the bare token in the `Authorization` header.
    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn auth_scheme(&self) -> &str {
        &self.auth_scheme
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_url)
    }
}

fn resolve_api_url(api_url_override: Option<String>) -> String {
    api_url_override
        .filter(|url| !url.trim().is_empty())
        .or_else(|| env::var(ENV_API_URL).ok().filter(|url| !url.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Override, then `TASKDECK_AUTH_SCHEME`, then `Bearer`. `none` (any case) or an empty
/// value means the token is sent bare.
pub fn resolve_auth_scheme(scheme_override: Option<String>) -> String {
    let scheme = scheme_override
        .or_else(|| env::var(ENV_AUTH_SCHEME).ok())
        .unwrap_or_else(|| DEFAULT_AUTH_SCHEME.to_string());
    let scheme = scheme.trim();
    if scheme.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        scheme.to_string()
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dev_dir = manifest_dir.join("..").join("tmp").join("dev-taskdeck");
        return Ok(dev_dir);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".taskdeck"));
    }

    Ok(env::current_dir()?.join(".taskdeck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn override_dir_is_created_and_holds_session_file() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let config = AppConfig::discover(
            Some(data_dir.clone()),
            Some("http://localhost:9000/".into()),
        )
        .unwrap();

        assert!(data_dir.is_dir());
        assert_eq!(config.session_path(), data_dir.join("session.json"));
        assert_eq!(config.api_url(), "http://localhost:9000");
        assert_eq!(config.endpoints().tasks(), "http://localhost:9000/task");
    }

    #[test]
    fn defaults_to_bearer_scheme_and_no_timeout() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::from_data_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.auth_scheme(), "Bearer");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.api_url(), DEFAULT_API_URL);

        let config = config
            .with_auth_scheme("")
            .with_request_timeout(Some(Duration::from_secs(5)));
        assert_eq!(config.auth_scheme(), "");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn auth_scheme_override_wins_and_none_means_bare_token() {
        assert_eq!(resolve_auth_scheme(Some(" Token ".into())), "Token");
        assert_eq!(resolve_auth_scheme(Some("NONE".into())), "");
        assert_eq!(resolve_auth_scheme(Some(String::new())), "");
    }

    #[test]
    fn blank_api_url_override_is_ignored() {
        assert!(!resolve_api_url(Some("  ".into())).trim().is_empty());
    }
}

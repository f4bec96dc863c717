use reqwest::Url;

use crate::model::TaskId;

pub const DEFAULT_API_URL: &str = "https://todo-api-b6d2.onrender.com";

/// URL builders for the remote API, rooted at a configurable base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn login(&self) -> String {
        format!("{}/auth/login", self.base)
    }

    pub fn signup(&self) -> String {
        format!("{}/auth/register", self.base)
    }

    pub fn logout(&self) -> String {
        format!("{}/auth/logout", self.base)
    }

    pub fn tasks(&self) -> String {
        format!("{}/task", self.base)
    }

    /// The id is appended as a single percent-encoded path segment.
    pub fn task(&self, id: &TaskId) -> String {
        let tasks = self.tasks();
        match Url::parse(&tasks) {
            Ok(mut url) if !url.cannot_be_a_base() => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.push(id.as_str());
                }
                url.into()
            }
            _ => format!("{}/{}", tasks, id),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

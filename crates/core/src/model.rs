use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::validation::{validate_title, ValidationError};

/// Opaque identifier assigned by the remote API. Numeric ids are kept in their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(TaskId(text)),
            Value::Number(number) => Ok(TaskId(number.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "task id must be a string or number, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTier {
    Low,
    Medium,
    High,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Low => "low",
            PriorityTier::Medium => "medium",
            PriorityTier::High => "high",
        }
    }
}

/// Task priority on a 1 (lowest) to 5 (highest) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::PriorityOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Lowest",
            2 => "Low",
            4 => "High",
            5 => "Highest",
            _ => "Medium",
        }
    }

    pub fn tier(self) -> PriorityTier {
        match self.0 {
            4 | 5 => PriorityTier::High,
            3 => PriorityTier::Medium,
            _ => PriorityTier::Low,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidPriority(trimmed.to_string()))?;
        Priority::new(value)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let parsed = match &raw {
            Value::Number(number) => number.as_i64().map(Priority::new),
            Value::String(text) => Some(text.parse::<Priority>()),
            Value::Null => return Ok(Priority::default()),
            _ => None,
        };
        match parsed {
            Some(Ok(priority)) => Ok(priority),
            _ => {
                tracing::warn!(value = %raw, "unreadable task priority; using default");
                Ok(Priority::default())
            }
        }
    }
}

/// Categorical color tag carried by each task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum TaskColor {
    #[default]
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
}

impl TaskColor {
    pub const ALL: [TaskColor; 8] = [
        TaskColor::Gray,
        TaskColor::Red,
        TaskColor::Orange,
        TaskColor::Yellow,
        TaskColor::Green,
        TaskColor::Blue,
        TaskColor::Purple,
        TaskColor::Pink,
    ];

    pub fn hex(&self) -> &'static str {
        match self {
            TaskColor::Gray => "#6b7280",
            TaskColor::Red => "#ef4444",
            TaskColor::Orange => "#f97316",
            TaskColor::Yellow => "#eab308",
            TaskColor::Green => "#22c55e",
            TaskColor::Blue => "#3b82f6",
            TaskColor::Purple => "#8b5cf6",
            TaskColor::Pink => "#ec4899",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskColor::Gray => "Gray",
            TaskColor::Red => "Red",
            TaskColor::Orange => "Orange",
            TaskColor::Yellow => "Yellow",
            TaskColor::Green => "Green",
            TaskColor::Blue => "Blue",
            TaskColor::Purple => "Purple",
            TaskColor::Pink => "Pink",
        }
    }
}

impl fmt::Display for TaskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        TaskColor::ALL
            .into_iter()
            .find(|color| {
                color.hex().eq_ignore_ascii_case(needle)
                    || color.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ValidationError::UnknownColor(needle.to_string()))
    }
}

impl Serialize for TaskColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

impl<'de> Deserialize<'de> for TaskColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(TaskColor::default()),
            Value::String(text) if text.trim().is_empty() => Ok(TaskColor::default()),
            Value::String(text) => Ok(text.parse().unwrap_or_else(|_| {
                tracing::warn!(value = text.as_str(), "unknown task color; using gray");
                TaskColor::default()
            })),
            other => {
                tracing::warn!(value = %other, "unknown task color; using gray");
                Ok(TaskColor::default())
            }
        }
    }
}

/// Calendar-date wire format: written as `YYYY-MM-DD`, read from that or an RFC 3339 timestamp.
pub mod due_date_format {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(text) => Ok(parse(&text)),
            other => {
                tracing::warn!(value = %other, "unreadable due date; treating as absent");
                Ok(None)
            }
        }
    }

    pub fn parse(text: &str) -> Option<NaiveDate> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(stamp.with_timezone(&Utc).date_naive());
        }
        tracing::warn!(value = trimmed, "unreadable due date; treating as absent");
        None
    }
}

/// Creation timestamps arrive as RFC 3339 strings or epoch milliseconds.
pub mod created_at_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let parsed = match &raw {
            Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|stamp| stamp.with_timezone(&Utc)),
            Value::Number(number) => number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        };
        Ok(parsed.unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unreadable creation time; using the epoch");
            DateTime::<Utc>::default()
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskId", alias = "id")]
    pub id: TaskId,
    #[serde(rename = "task")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: TaskColor,
    #[serde(rename = "dueDate", default, with = "due_date_format")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "isComplete", alias = "completed", default)]
    pub completed: bool,
    /// Missing or unreadable timestamps read as the Unix epoch, so such tasks sort as the oldest.
    #[serde(alias = "createdAt", default, deserialize_with = "created_at_format::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A completed task is never overdue, whatever its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Full record with the patch fields written over this task's fields.
    pub fn merged(&self, patch: &TaskPatch) -> Task {
        let mut merged = self.clone();
        if let Some(title) = &patch.title {
            merged.title = title.clone();
        }
        if let Some(description) = &patch.description {
            merged.description = description.clone();
        }
        if let Some(color) = patch.color {
            merged.color = color;
        }
        if let Some(due_date) = patch.due_date {
            merged.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            merged.priority = priority;
        }
        if let Some(completed) = patch.completed {
            merged.completed = completed;
        }
        merged
    }

    pub fn toggled(&self) -> Task {
        let mut toggled = self.clone();
        toggled.completed = !self.completed;
        toggled
    }
}

/// A task payload before the server assigns its identifier and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(rename = "task")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: TaskColor,
    #[serde(rename = "dueDate", default, with = "due_date_format")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            color: TaskColor::default(),
            due_date: None,
            priority: Priority::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

/// Field edits for an existing task. Double options distinguish "leave as is" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<TaskColor>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// Named filter selector applied to the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Criterion {
    #[default]
    All,
    Completed,
    Pending,
    Overdue,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::All => "all",
            Criterion::Completed => "completed",
            Criterion::Pending => "pending",
            Criterion::Overdue => "overdue",
        }
    }

    /// Unrecognized names select everything.
    pub fn parse_or_all(name: &str) -> Self {
        name.parse().unwrap_or(Criterion::All)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Criterion::All),
            "completed" | "done" => Ok(Criterion::Completed),
            "pending" => Ok(Criterion::Pending),
            "overdue" => Ok(Criterion::Overdue),
            other => Err(anyhow::anyhow!(
                "Unknown filter '{}': expected all|completed|pending|overdue",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    CreatedDesc,
    CreatedAsc,
    DueDateAsc,
    DueDateDesc,
    PriorityDesc,
    PriorityAsc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedDesc => "createdDesc",
            SortKey::CreatedAsc => "createdAsc",
            SortKey::DueDateAsc => "dueDateAsc",
            SortKey::DueDateDesc => "dueDateDesc",
            SortKey::PriorityDesc => "priorityDesc",
            SortKey::PriorityAsc => "priorityAsc",
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "createddesc" => Ok(SortKey::CreatedDesc),
            "createdasc" => Ok(SortKey::CreatedAsc),
            "duedateasc" | "dueasc" => Ok(SortKey::DueDateAsc),
            "duedatedesc" | "duedesc" => Ok(SortKey::DueDateDesc),
            "prioritydesc" => Ok(SortKey::PriorityDesc),
            "priorityasc" => Ok(SortKey::PriorityAsc),
            _ => Err(anyhow::anyhow!(
                "Unknown sort '{}': expected createdDesc|createdAsc|dueDateAsc|dueDateDesc|priorityDesc|priorityAsc",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn wire_task() -> Value {
        json!({
            "taskId": 42,
            "task": "Write report",
            "description": "quarterly",
            "color": "#ef4444",
            "dueDate": "2024-03-05T00:00:00.000Z",
            "priority": "4",
            "isComplete": false,
            "created_at": "2024-03-01T10:00:00Z"
        })
    }

    #[test]
    fn reads_remote_task_shape() {
        let task: Task = serde_json::from_value(wire_task()).unwrap();
        assert_eq!(task.id.as_str(), "42");
        assert_eq!(task.title, "Write report");
        assert_eq!(task.color, TaskColor::Red);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(task.priority.value(), 4);
        assert!(!task.completed);
    }

    #[test]
    fn writes_canonical_names() {
        let task: Task = serde_json::from_value(wire_task()).unwrap();
        let written = serde_json::to_value(&task).unwrap();
        assert_eq!(written["taskId"], json!("42"));
        assert_eq!(written["task"], json!("Write report"));
        assert_eq!(written["dueDate"], json!("2024-03-05"));
        assert_eq!(written["priority"], json!(4));
        assert_eq!(written["isComplete"], json!(false));
        assert_eq!(written["color"], json!("#ef4444"));
    }

    #[test]
    fn tolerates_legacy_and_missing_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "abc",
            "task": "Legacy",
            "completed": true,
            "priority": "urgent",
            "color": "chartreuse",
            "dueDate": "not a date",
            "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(task.id.as_str(), "abc");
        assert!(task.completed);
        assert_eq!(task.priority, Priority::default());
        assert_eq!(task.color, TaskColor::Gray);
        assert_eq!(task.due_date, None);
        assert_eq!(task.description, None);
    }

    #[test]
    fn reads_camel_case_creation_time() {
        let mut wire = wire_task();
        let stamp = wire["created_at"].take();
        wire["createdAt"] = stamp;
        wire.as_object_mut().unwrap().remove("created_at");
        let task: Task = serde_json::from_value(wire).unwrap();
        assert_eq!(task.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        let written = serde_json::to_value(&task).unwrap();
        assert!(written.get("created_at").is_some());
    }

    #[test]
    fn one_task_without_creation_time_keeps_the_list_readable() {
        let mut bare = wire_task();
        bare.as_object_mut().unwrap().remove("created_at");
        bare["taskId"] = json!(43);
        let mut millis = wire_task();
        millis["created_at"] = json!(1_709_287_200_000_i64);
        let tasks: Vec<Task> = serde_json::from_value(json!([wire_task(), bare, millis])).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].created_at, DateTime::<Utc>::default());
        assert_eq!(tasks[2].created_at, tasks[0].created_at);
    }

    #[rstest]
    #[case(1, "Lowest", PriorityTier::Low)]
    #[case(2, "Low", PriorityTier::Low)]
    #[case(3, "Medium", PriorityTier::Medium)]
    #[case(4, "High", PriorityTier::High)]
    #[case(5, "Highest", PriorityTier::High)]
    fn priority_labels(#[case] value: i64, #[case] label: &str, #[case] tier: PriorityTier) {
        let priority = Priority::new(value).unwrap();
        assert_eq!(priority.label(), label);
        assert_eq!(priority.tier(), tier);
    }

    #[test]
    fn priority_rejects_out_of_range() {
        assert_eq!(
            Priority::new(0),
            Err(ValidationError::PriorityOutOfRange(0))
        );
        assert!(Priority::new(6).is_err());
        assert_eq!("5".parse::<Priority>().unwrap().value(), 5);
    }

    #[test]
    fn color_parses_hex_and_label() {
        assert_eq!("#3B82F6".parse::<TaskColor>().unwrap(), TaskColor::Blue);
        assert_eq!("purple".parse::<TaskColor>().unwrap(), TaskColor::Purple);
        assert!("teal".parse::<TaskColor>().is_err());
    }

    #[test]
    fn completed_tasks_are_never_overdue() {
        let mut task: Task = serde_json::from_value(wire_task()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        assert!(task.is_overdue(today));
        assert!(!task.is_overdue(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
        task.completed = true;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn merge_overwrites_only_patched_fields() {
        let task: Task = serde_json::from_value(wire_task()).unwrap();
        let patch = TaskPatch {
            title: Some("Final report".into()),
            description: Some(None),
            due_date: Some(None),
            ..TaskPatch::default()
        };
        let merged = task.merged(&patch);
        assert_eq!(merged.title, "Final report");
        assert_eq!(merged.description, None);
        assert_eq!(merged.due_date, None);
        assert_eq!(merged.priority, task.priority);
        assert_eq!(merged.created_at, task.created_at);
        assert_eq!(merged.id, task.id);
    }

    #[test]
    fn criterion_names_fall_back_to_all() {
        assert_eq!(Criterion::parse_or_all("overDue"), Criterion::Overdue);
        assert_eq!(Criterion::parse_or_all("completed"), Criterion::Completed);
        assert_eq!(Criterion::parse_or_all("someday"), Criterion::All);
    }

    #[test]
    fn sort_keys_accept_camel_and_kebab_case() {
        assert_eq!("priorityDesc".parse::<SortKey>().unwrap(), SortKey::PriorityDesc);
        assert_eq!("due-date-asc".parse::<SortKey>().unwrap(), SortKey::DueDateAsc);
        assert!("newest".parse::<SortKey>().is_err());
    }
}

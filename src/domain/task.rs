use crate::domain::board::UserId;
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a task (e.g., task-0b6f...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    const PREFIX: &'static str = "task-";

    /// Generates a fresh, never-reused id
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TaskId {
    type Err = BoardError;

    // Ids are opaque; anything non-blank is accepted so imported boards keep their ids.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(BoardError::InvalidArgument("task id must not be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(BoardError::InvalidArgument(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high",
                s
            ))),
        }
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserId,
}

impl Task {
    /// Builds a task from creation data, stamping both timestamps with the same instant
    pub fn new(id: TaskId, data: NewTask, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            created_at: now,
            updated_at: now,
            owner,
        }
    }

    /// Refreshes `updated_at`, never letting it fall behind `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// Caller-supplied content for a new task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BoardError::empty_title("Task"));
        }
        Ok(())
    }
}

/// Partial update for a task. `None` leaves a field untouched.
///
/// `description` is doubly optional: `Some(None)` clears the description,
/// `Some(Some(text))` replaces it. Stage membership is deliberately absent;
/// moving a task goes through `BoardStore::move_task`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
}

impl TaskUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.priority.is_none()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(BoardError::empty_title("Task")),
            _ => Ok(()),
        }
    }

    /// Merges the provided fields into `task` and refreshes `updated_at`
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        task.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task::new(
            TaskId::generate(),
            NewTask::new("Write docs")
                .with_description("README and examples")
                .with_priority(Priority::High),
            UserId::placeholder(),
        )
    }

    #[test]
    fn test_task_id_generation_is_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("task-"));
    }

    #[test]
    fn test_task_id_parsing() {
        let id = TaskId::from_str("task-legacy-1").unwrap();
        assert_eq!(id.as_str(), "task-legacy-1");
        assert!(TaskId::from_str("   ").is_err());
    }

    #[test]
    fn test_priority_parsing_and_order() {
        assert_eq!(Priority::from_str("HIGH").unwrap(), Priority::High);
        assert_eq!(Priority::from_str("low").unwrap(), Priority::Low);
        assert!(Priority::from_str("urgent").is_err());
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_new_task_timestamps_match() {
        let task = sample_task();
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.owner, UserId::placeholder());
    }

    #[test]
    fn test_new_task_rejects_blank_title() {
        assert!(NewTask::new("  \t").validate().is_err());
        assert!(NewTask::new("ok").validate().is_ok());
    }

    #[test]
    fn test_empty_update_only_touches_updated_at() {
        let mut task = sample_task();
        let before = task.clone();

        std::thread::sleep(std::time::Duration::from_millis(10));
        TaskUpdate::new().apply(&mut task);

        assert!(task.updated_at > before.updated_at);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.created_at, before.created_at);
    }

    #[test]
    fn test_partial_update_merges_fields() {
        let mut task = sample_task();
        TaskUpdate::new().priority(Priority::Low).apply(&mut task);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.title, "Write docs");

        TaskUpdate::new().clear_description().apply(&mut task);
        assert!(task.description.is_none());

        TaskUpdate::new().title("Ship docs").description("v2").apply(&mut task);
        assert_eq!(task.title, "Ship docs");
        assert_eq!(task.description.as_deref(), Some("v2"));
    }

    #[test]
    fn test_update_rejects_blank_title() {
        assert!(TaskUpdate::new().title(" ").validate().is_err());
        assert!(TaskUpdate::new().validate().is_ok());
        assert!(TaskUpdate::new().is_empty());
    }

    #[test]
    fn test_task_serialization_without_description() {
        let mut task = sample_task();
        task.description = None;
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("description"));
        assert!(json.contains(r#""priority":"high""#));
    }
}

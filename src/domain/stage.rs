use crate::domain::board::BoardId;
use crate::domain::task::TaskId;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a stage (column)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId(String);

impl StageId {
    const PREFIX: &'static str = "stage-";

    /// Generates a fresh, never-reused id
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StageId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(BoardError::InvalidArgument("stage id must not be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column on the board holding an ordered list of task references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub title: String,
    /// Sort key among the board's stages; need not be contiguous or unique
    pub order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Membership and display order of this stage's tasks
    pub task_ids: Vec<TaskId>,
    pub board_id: BoardId,
}

impl Stage {
    pub fn new(id: StageId, data: NewStage, board_id: BoardId) -> Self {
        Self {
            id,
            title: data.title,
            order: data.order,
            color: data.color,
            task_ids: Vec::new(),
            board_id,
        }
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.task_ids.contains(task_id)
    }

    pub fn position_of(&self, task_id: &TaskId) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.task_ids.len()
    }

    /// Numeric order comparison; `-0.0` and `0.0` are equal
    pub fn cmp_order(&self, other: &Stage) -> Ordering {
        (self.order + 0.0).total_cmp(&(other.order + 0.0))
    }
}

/// Caller-supplied content for a new stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStage {
    pub title: String,
    pub order: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewStage {
    /// Indigo, the color offered first when adding a column
    pub const DEFAULT_COLOR: &'static str = "#6366f1";

    pub fn new(title: impl Into<String>, order: f64) -> Self {
        Self {
            title: title.into(),
            order,
            color: Some(Self::DEFAULT_COLOR.to_string()),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn without_color(mut self) -> Self {
        self.color = None;
        self
    }

    /// Checks the title and normalizes the order
    pub(crate) fn validate(mut self) -> Result<Self> {
        if self.title.trim().is_empty() {
            return Err(BoardError::empty_title("Stage"));
        }
        self.order = normalize_order(self.order)?;
        Ok(self)
    }
}

/// Rejects non-finite orders and folds `-0.0` into `0.0`
pub(crate) fn normalize_order(order: f64) -> Result<f64> {
    if !order.is_finite() {
        return Err(BoardError::InvalidArgument(format!(
            "stage order must be a finite number, got {order}"
        )));
    }
    Ok(order + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stage_defaults() {
        let data = NewStage::new("Backlog", 1.0);
        assert_eq!(data.color.as_deref(), Some(NewStage::DEFAULT_COLOR));

        let stage = Stage::new(StageId::generate(), data, BoardId::generate());
        assert!(stage.task_ids.is_empty());
        assert_eq!(stage.task_count(), 0);
        assert!(stage.id.as_str().starts_with("stage-"));
    }

    #[test]
    fn test_new_stage_validation() {
        assert!(NewStage::new("", 1.0).validate().is_err());
        assert!(NewStage::new("Done", f64::NAN).validate().is_err());
        assert!(NewStage::new("Done", f64::INFINITY).validate().is_err());
        assert!(NewStage::new("Done", -3.5).validate().is_ok());
    }

    #[test]
    fn test_negative_zero_order_is_normalized() {
        let data = NewStage::new("Done", -0.0).validate().unwrap();
        assert_eq!(data.order, 0.0);
        assert!(data.order.is_sign_positive());
        assert_eq!(normalize_order(2.5).unwrap(), 2.5);
    }

    #[test]
    fn test_position_of() {
        let mut stage = Stage::new(
            StageId::generate(),
            NewStage::new("Doing", 2.0).without_color(),
            BoardId::generate(),
        );
        let a = TaskId::generate();
        let b = TaskId::generate();
        stage.task_ids = vec![a.clone(), b.clone()];

        assert_eq!(stage.position_of(&b), Some(1));
        assert!(stage.contains(&a));
        assert!(stage.position_of(&TaskId::generate()).is_none());
    }
}

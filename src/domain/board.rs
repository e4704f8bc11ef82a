use crate::domain::stage::{Stage, StageId};
use crate::domain::task::{Task, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardId(String);

impl BoardId {
    const PREFIX: &'static str = "board-";

    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BoardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a board or task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    // There is no authentication yet, so every record belongs to the same user
    const PLACEHOLDER: &'static str = "current-user";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn placeholder() -> Self {
        Self(Self::PLACEHOLDER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kanban board state: the aggregate of stages and tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Kept sorted ascending by `order`
    pub stages: Vec<Stage>,
    pub tasks: Vec<Task>,
}

impl Board {
    /// Creates an empty board. Boards are seeded or imported by callers;
    /// the store only ever mutates an existing one.
    pub fn new(title: impl Into<String>, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: BoardId::generate(),
            title: title.into(),
            description: None,
            owner,
            created_at: now,
            updated_at: now,
            stages: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.id == id)
    }

    pub(crate) fn stage_index(&self, id: &StageId) -> Option<usize> {
        self.stages.iter().position(|s| &s.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub(crate) fn task_index(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Finds the stage whose `task_ids` currently holds the task
    pub fn stage_of_task(&self, task_id: &TaskId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.contains(task_id))
    }

    /// Tasks referenced by no stage
    pub fn orphaned_tasks(&self) -> Vec<&Task> {
        let referenced: HashSet<&TaskId> =
            self.stages.iter().flat_map(|s| s.task_ids.iter()).collect();
        self.tasks
            .iter()
            .filter(|t| !referenced.contains(&t.id))
            .collect()
    }

    /// Order value that places a new stage after every existing one
    pub fn next_stage_order(&self) -> f64 {
        self.stages
            .iter()
            .map(|s| s.order)
            .fold(0.0_f64, f64::max)
            + 1.0
    }

    /// Stable sort by `order`; stages with equal order keep their relative position
    pub fn sort_stages(&mut self) {
        self.stages.sort_by(Stage::cmp_order);
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Lists every structural problem with the aggregate: duplicate ids,
    /// dangling or repeated memberships, foreign stages, blank titles and
    /// timestamps running backwards.
    ///
    /// Orphaned tasks are not a violation here. They are a legal result of
    /// deleting the last stage and survive later stage creation; see
    /// [`Board::orphaned_tasks`].
    pub fn integrity_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.updated_at < self.created_at {
            problems.push(format!("board {} updated before it was created", self.id));
        }

        let mut task_ids = HashSet::new();
        for task in &self.tasks {
            if !task_ids.insert(&task.id) {
                problems.push(format!("duplicate task id {}", task.id));
            }
            if task.title.trim().is_empty() {
                problems.push(format!("task {} has an empty title", task.id));
            }
            if task.updated_at < task.created_at {
                problems.push(format!("task {} updated before it was created", task.id));
            }
        }

        let mut stage_ids = HashSet::new();
        let mut owner_of: HashMap<&TaskId, &StageId> = HashMap::new();
        for stage in &self.stages {
            if !stage_ids.insert(&stage.id) {
                problems.push(format!("duplicate stage id {}", stage.id));
            }
            if stage.title.trim().is_empty() {
                problems.push(format!("stage {} has an empty title", stage.id));
            }
            if !stage.order.is_finite() {
                problems.push(format!("stage {} has a non-finite order", stage.id));
            }
            if stage.board_id != self.id {
                problems.push(format!(
                    "stage {} belongs to board {}, not {}",
                    stage.id, stage.board_id, self.id
                ));
            }
            for task_id in &stage.task_ids {
                if !task_ids.contains(task_id) {
                    problems.push(format!("stage {} references unknown task {}", stage.id, task_id));
                }
                if let Some(previous) = owner_of.insert(task_id, &stage.id) {
                    problems.push(format!(
                        "task {} listed in both {} and {}",
                        task_id, previous, stage.id
                    ));
                }
            }
        }

        problems
    }

    pub fn is_consistent(&self) -> bool {
        self.integrity_violations().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::NewStage;
    use crate::domain::task::NewTask;

    fn board_with_stage(order: f64) -> (Board, StageId) {
        let mut board = Board::new("Sprint", UserId::placeholder());
        let id = StageId::generate();
        board
            .stages
            .push(Stage::new(id.clone(), NewStage::new("Todo", order), board.id.clone()));
        (board, id)
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new("Sprint", UserId::placeholder()).with_description("Q3");
        assert!(board.stages.is_empty());
        assert!(board.tasks.is_empty());
        assert_eq!(board.created_at, board.updated_at);
        assert_eq!(board.description.as_deref(), Some("Q3"));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_next_stage_order() {
        let board = Board::new("Empty", UserId::placeholder());
        assert_eq!(board.next_stage_order(), 1.0);

        let (board, _) = board_with_stage(4.0);
        assert_eq!(board.next_stage_order(), 5.0);

        // Negative orders never pull the next slot below 1
        let (board, _) = board_with_stage(-2.0);
        assert_eq!(board.next_stage_order(), 1.0);
    }

    #[test]
    fn test_sort_stages_is_stable() {
        let mut board = Board::new("Sprint", UserId::placeholder());
        for (title, order) in [("b", 2.0), ("a1", 1.0), ("a2", 1.0), ("c", 0.5)] {
            board.stages.push(Stage::new(
                StageId::generate(),
                NewStage::new(title, order),
                board.id.clone(),
            ));
        }
        board.sort_stages();
        let titles: Vec<_> = board.stages.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a1", "a2", "b"]);
    }

    #[test]
    fn test_sort_stages_treats_signed_zeros_as_equal() {
        let mut board = Board::new("Imported", UserId::placeholder());
        for (title, order) in [("plus", 0.0), ("minus", -0.0), ("neg", -1.0)] {
            board.stages.push(Stage::new(
                StageId::generate(),
                NewStage::new(title, order),
                board.id.clone(),
            ));
        }
        board.sort_stages();
        let titles: Vec<_> = board.stages.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["neg", "plus", "minus"]);
    }

    #[test]
    fn test_integrity_detects_dangling_reference() {
        let (mut board, stage_id) = board_with_stage(1.0);
        let task = Task::new(TaskId::generate(), NewTask::new("t"), UserId::placeholder());
        board.tasks.push(task.clone());

        // Unreferenced, but structurally sound
        assert!(board.is_consistent());
        assert_eq!(board.orphaned_tasks().len(), 1);

        let idx = board.stage_index(&stage_id).unwrap();
        board.stages[idx].task_ids.push(task.id.clone());
        assert!(board.orphaned_tasks().is_empty());
        assert_eq!(board.stage_of_task(&task.id).unwrap().id, stage_id);

        board.stages[idx].task_ids.push(TaskId::generate());
        let problems = board.integrity_violations();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("unknown task"));
    }

    #[test]
    fn test_integrity_detects_duplicate_membership() {
        let (mut board, first) = board_with_stage(1.0);
        let second = StageId::generate();
        board
            .stages
            .push(Stage::new(second, NewStage::new("Done", 2.0), board.id.clone()));
        let task = Task::new(TaskId::generate(), NewTask::new("t"), UserId::placeholder());
        board.tasks.push(task.clone());
        for stage in &mut board.stages {
            stage.task_ids.push(task.id.clone());
        }

        let problems = board.integrity_violations();
        assert!(problems.iter().any(|p| p.contains("listed in both")));
        assert!(board.stage(&first).is_some());
    }

    #[test]
    fn test_orphans_allowed_without_stages() {
        let mut board = Board::new("Sprint", UserId::placeholder());
        board
            .tasks
            .push(Task::new(TaskId::generate(), NewTask::new("t"), UserId::placeholder()));
        assert!(board.is_consistent());
        assert_eq!(board.orphaned_tasks().len(), 1);
    }
}

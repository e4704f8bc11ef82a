//! The board store: single owner of a [`Board`] and the only place it is mutated.
//!
//! Every operation validates all of its preconditions before touching the
//! aggregate, so a rejected call leaves the board exactly as it was. The
//! store is single-writer; callers sharing it across threads must wrap the
//! whole store in one lock (e.g. `tokio::sync::Mutex<BoardStore>`), since
//! membership invariants do not survive interleaved moves.

use crate::config::StoreConfig;
use crate::domain::board::Board;
use crate::domain::stage::{normalize_order, NewStage, Stage, StageId};
use crate::domain::task::{NewTask, Task, TaskId, TaskUpdate};
use crate::error::{BoardError, Result};
use crate::snapshot;
use crate::storage::Storage;
use tracing::{debug, warn};

/// Owns the canonical board and applies invariant-preserving mutations to it
#[derive(Debug, Clone)]
pub struct BoardStore {
    board: Board,
    config: StoreConfig,
}

impl BoardStore {
    /// Wraps a caller-supplied board using the default configuration
    pub fn new(board: Board) -> Self {
        Self::with_config(board, StoreConfig::default())
    }

    pub fn with_config(mut board: Board, config: StoreConfig) -> Self {
        board.sort_stages();
        Self { board, config }
    }

    /// Current board; re-read after every mutation
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Creates a task at the end of the given stage and returns its id
    pub fn create_task(&mut self, stage_id: &StageId, data: NewTask) -> Result<TaskId> {
        data.validate()?;
        let stage_idx = self.require_stage(stage_id)?;

        let id = TaskId::generate();
        let task = Task::new(id.clone(), data, self.config.owner.clone());
        self.board.tasks.push(task);
        self.board.stages[stage_idx].task_ids.push(id.clone());
        self.board.touch();

        debug!(task_id = %id, stage_id = %stage_id, "Task created");
        Ok(id)
    }

    /// Adds an empty stage and keeps stages sorted by order
    pub fn create_stage(&mut self, data: NewStage) -> Result<StageId> {
        let data = data.validate()?;

        let id = StageId::generate();
        let stage = Stage::new(id.clone(), data, self.board.id.clone());
        self.board.stages.push(stage);
        self.board.sort_stages();
        self.board.touch();

        debug!(stage_id = %id, "Stage created");
        Ok(id)
    }

    /// Merges the provided fields into a task. Membership is never changed here.
    pub fn update_task(&mut self, task_id: &TaskId, updates: TaskUpdate) -> Result<&Task> {
        updates.validate()?;
        let task_idx = self.require_task(task_id)?;

        updates.apply(&mut self.board.tasks[task_idx]);
        self.board.touch();

        debug!(task_id = %task_id, "Task updated");
        Ok(&self.board.tasks[task_idx])
    }

    /// Moves a task between stages, or within one stage when `from == to`.
    ///
    /// `new_index` is a position in the target list *after* the task has been
    /// removed from its source, so it must lie in `0..=len`. `None` appends.
    pub fn move_task(
        &mut self,
        task_id: &TaskId,
        from: &StageId,
        to: &StageId,
        new_index: Option<usize>,
    ) -> Result<()> {
        let task_idx = self.require_task(task_id)?;
        let from_idx = self.require_stage(from)?;
        let to_idx = self.require_stage(to)?;

        let Some(position) = self.board.stages[from_idx].position_of(task_id) else {
            warn!(task_id = %task_id, stage_id = %from, "Move rejected: task not in source stage");
            return Err(BoardError::TaskNotInStage {
                task: task_id.to_string(),
                stage: from.to_string(),
            });
        };

        let target_len = if from_idx == to_idx {
            self.board.stages[to_idx].task_count() - 1
        } else {
            self.board.stages[to_idx].task_count()
        };
        if let Some(index) = new_index {
            if index > target_len {
                return Err(BoardError::InvalidArgument(format!(
                    "index {index} out of range for stage {to} with {target_len} tasks"
                )));
            }
        }

        // Remove then insert on the same list, so in-stage reorders never duplicate
        self.board.stages[from_idx].task_ids.remove(position);
        let target = &mut self.board.stages[to_idx].task_ids;
        match new_index {
            Some(index) => target.insert(index, task_id.clone()),
            None => target.push(task_id.clone()),
        }

        self.board.tasks[task_idx].touch();
        self.board.touch();

        debug!(task_id = %task_id, from = %from, to = %to, index = ?new_index, "Task moved");
        Ok(())
    }

    /// Moves a task to `to`, taking the source stage from current membership
    pub fn move_task_to(
        &mut self,
        task_id: &TaskId,
        to: &StageId,
        new_index: Option<usize>,
    ) -> Result<()> {
        self.require_task(task_id)?;
        let from = self
            .board
            .stage_of_task(task_id)
            .map(|s| s.id.clone())
            .ok_or_else(|| BoardError::TaskNotInStage {
                task: task_id.to_string(),
                stage: "<none>".to_string(),
            })?;
        self.move_task(task_id, &from, to, new_index)
    }

    /// Removes a task and its membership entry; returns the removed task
    pub fn delete_task(&mut self, task_id: &TaskId) -> Result<Task> {
        let task_idx = self.require_task(task_id)?;

        let task = self.board.tasks.remove(task_idx);
        for stage in &mut self.board.stages {
            stage.task_ids.retain(|id| id != task_id);
        }
        self.board.touch();

        debug!(task_id = %task_id, "Task deleted");
        Ok(task)
    }

    /// Removes a stage. Its tasks are appended, in order, to the first remaining
    /// stage. Deleting the only stage leaves its tasks orphaned.
    pub fn delete_stage(&mut self, stage_id: &StageId) -> Result<Stage> {
        let stage_idx = self.require_stage(stage_id)?;
        let removed = self.board.stages.remove(stage_idx);

        let first = self
            .board
            .stages
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp_order(b))
            .map(|(idx, _)| idx);

        match first {
            Some(first_idx) => {
                for task_id in &removed.task_ids {
                    if let Some(task_idx) = self.board.task_index(task_id) {
                        self.board.tasks[task_idx].touch();
                    }
                }
                self.board.stages[first_idx]
                    .task_ids
                    .extend(removed.task_ids.iter().cloned());
                debug!(
                    stage_id = %stage_id,
                    target = %self.board.stages[first_idx].id,
                    moved = removed.task_ids.len(),
                    "Stage deleted, tasks reassigned"
                );
            }
            None if !removed.task_ids.is_empty() => {
                warn!(
                    stage_id = %stage_id,
                    orphaned = removed.task_ids.len(),
                    "Last stage deleted, tasks left without a stage"
                );
            }
            None => debug!(stage_id = %stage_id, "Last stage deleted"),
        }

        self.board.touch();
        Ok(removed)
    }

    /// Sets a stage's order and re-sorts the stages
    pub fn reorder_stage(&mut self, stage_id: &StageId, new_order: f64) -> Result<()> {
        let new_order = normalize_order(new_order)?;
        let stage_idx = self.require_stage(stage_id)?;

        self.board.stages[stage_idx].order = new_order;
        self.board.sort_stages();
        self.board.touch();

        debug!(stage_id = %stage_id, order = new_order, "Stage reordered");
        Ok(())
    }

    /// Tasks of a stage in display order. Unknown stages and unresolvable ids
    /// yield nothing rather than an error.
    pub fn tasks_by_stage(&self, stage_id: &StageId) -> Vec<&Task> {
        let Some(stage) = self.board.stage(stage_id) else {
            return Vec::new();
        };
        stage
            .task_ids
            .iter()
            .filter_map(|id| self.board.task(id))
            .collect()
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.board.task(task_id)
    }

    pub fn stage(&self, stage_id: &StageId) -> Option<&Stage> {
        self.board.stage(stage_id)
    }

    pub fn stage_of_task(&self, task_id: &TaskId) -> Option<&Stage> {
        self.board.stage_of_task(task_id)
    }

    pub fn orphaned_tasks(&self) -> Vec<&Task> {
        self.board.orphaned_tasks()
    }

    pub fn next_stage_order(&self) -> f64 {
        self.board.next_stage_order()
    }

    /// Encodes the whole board
    pub fn save_snapshot(&self) -> Result<String> {
        snapshot::encode(&self.board, self.config.pretty_snapshots)
    }

    /// Replaces the board with a decoded snapshot. On failure the current
    /// board is kept.
    pub fn load_snapshot(&mut self, blob: &str) -> Result<()> {
        let mut board = snapshot::decode(blob).map_err(|e| {
            warn!(error = %e, "Snapshot rejected");
            e
        })?;
        board.sort_stages();
        debug!(board_id = %board.id, "Snapshot loaded");
        self.board = board;
        Ok(())
    }

    /// Persists the current board under its configured key
    pub async fn save_to(&self, storage: &dyn Storage) -> Result<()> {
        let key = self.config.snapshot_key(&self.board.id);
        let blob = self.save_snapshot()?;
        storage.save_snapshot(&key, &blob).await
    }

    /// Restores the board saved under the current board's key.
    ///
    /// Returns `Ok(false)` when nothing has been saved yet.
    pub async fn load_from(&mut self, storage: &dyn Storage) -> Result<bool> {
        let key = self.config.snapshot_key(&self.board.id);
        match storage.load_snapshot(&key).await? {
            Some(blob) => {
                self.load_snapshot(&blob)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn require_task(&self, task_id: &TaskId) -> Result<usize> {
        self.board
            .task_index(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))
    }

    fn require_stage(&self, stage_id: &StageId) -> Result<usize> {
        self.board
            .stage_index(stage_id)
            .ok_or_else(|| BoardError::StageNotFound(stage_id.to_string()))
    }
}

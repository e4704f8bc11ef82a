//! # Stageboard Core
//!
//! Board state management for stage-based kanban boards.
//!
//! A [`BoardStore`] owns one [`Board`] aggregate of stages (columns) and
//! tasks (cards) and exposes the mutations a presentation layer needs:
//! creating, editing, moving and deleting tasks, adding, reordering and
//! deleting stages, plus snapshot save/load. Every mutation either fully
//! applies or leaves the board untouched.

pub mod config;
pub mod domain;
pub mod error;
pub mod snapshot;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::StoreConfig;
pub use domain::{
    board::{Board, BoardId, UserId},
    stage::{NewStage, Stage, StageId},
    task::{NewTask, Priority, Task, TaskId, TaskUpdate},
};
pub use error::{BoardError, Result};
pub use storage::Storage;
pub use store::BoardStore;

pub mod board;
pub mod stage;
pub mod task;

pub use board::{Board, BoardId, UserId};
pub use stage::{NewStage, Stage, StageId};
pub use task::{NewTask, Priority, Task, TaskId, TaskUpdate};

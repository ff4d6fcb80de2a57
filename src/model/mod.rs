pub mod error;
pub mod task;
pub mod task_id;

pub use error::ModelError;
pub use task::{NewTask, Priority as TaskPriority, Status as TaskStatus, Task, TaskDraft};
pub use task_id::{InvalidTaskId, TaskId};

mod api;
mod board;

pub use api::{ClientError, TaskClient};
pub use board::TaskBoard;

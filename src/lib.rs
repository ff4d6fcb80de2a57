pub mod client;
pub mod config;
pub mod controller;
pub mod datastore;
pub mod log;
pub mod model;

pub use client::{TaskBoard, TaskClient};
pub use controller::{TaskController, TaskService};
pub use model::{NewTask, Task, TaskId};

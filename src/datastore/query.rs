use std::cmp::Ordering;

use crate::model::{Task, TaskStatus};

/// Sort order applied by the store. Ties keep insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    CreatedDesc,
    CreatedAsc,
    CompletedDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub status: Option<TaskStatus>,
    pub sort: Sort,
}

impl Filter {
    /// Every task, newest first.
    pub fn all() -> Self {
        Self {
            status: None,
            sort: Sort::CreatedDesc,
        }
    }

    /// Pending tasks, oldest first.
    pub fn pending() -> Self {
        Self {
            status: Some(TaskStatus::Pending),
            sort: Sort::CreatedAsc,
        }
    }

    /// Completed tasks, most recently completed first.
    pub fn completed() -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            sort: Sort::CompletedDesc,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self.status {
            Some(status) => task.status == status,
            None => true,
        }
    }

    /// Filters and sorts documents given in insertion order.
    pub fn apply<'a, I>(&self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut list = tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect::<Vec<Task>>();
        list.sort_by(|a, b| self.compare(a, b));
        list
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self.sort {
            Sort::CreatedAsc => a.created_at.cmp(&b.created_at),
            Sort::CreatedDesc => b.created_at.cmp(&a.created_at),
            // documents without a completion time sort last
            Sort::CompletedDesc => match (a.completed_at, b.completed_at) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

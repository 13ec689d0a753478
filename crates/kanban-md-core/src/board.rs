use serde::{Deserialize, Serialize};

use crate::task::{generate_id, Task};

/// Suffix marking an archived column heading.
pub const ARCHIVED_MARKER: &str = "[Archived]";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub title: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub archived: bool,
}

impl Column {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            tasks: Vec::new(),
            archived: false,
        }
    }

    /// Heading text as written, including the archive marker.
    pub fn heading(&self) -> String {
        if self.archived && self.title.is_empty() {
            ARCHIVED_MARKER.to_string()
        } else if self.archived {
            format!("{} {ARCHIVED_MARKER}", self.title)
        } else {
            self.title.clone()
        }
    }
}

impl Board {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// First column whose title matches exactly.
    pub fn column_by_title(&self, title: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.title == title)
    }

    pub fn task_mut(&mut self, column_id: &str, task_id: &str) -> Option<&mut Task> {
        self.column_mut(column_id)?
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
    }

    /// Locate a task anywhere on the board together with its column.
    pub fn find_task(&self, task_id: &str) -> Option<(&Column, &Task)> {
        self.columns.iter().find_map(|column| {
            column
                .tasks
                .iter()
                .find(|t| t.id == task_id)
                .map(|task| (column, task))
        })
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter())
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.columns.iter_mut().flat_map(|c| c.tasks.iter_mut())
    }
}

//! Task detail files: a per-task sidecar holding only `steps` and
//! `description`.
//!
//! ```markdown
//! # t1
//!
//!   - steps:
//!       - [ ] first
//!       - [x] second
//!     ```md
//!     free text
//!     ```
//! ```
//!
//! When a task names a detail file, that file is authoritative for both
//! fields and the board document never carries them inline.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::Board;
use crate::error::KanbanError;
use crate::generator::{write_description, write_steps};
use crate::parser::parse_markdown;
use crate::syntax::{
    is_detail_description_fence, is_detail_steps_line, is_fence_close, normalize_newlines, step_line,
    strip_description_indent,
};
use crate::task::{Step, Task};

/// The slice of a task stored in its detail file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where a task's detail file lives.
///
/// Absolute paths are used as-is; relative ones are resolved against the
/// directory holding the board file. Every read and write of a detail file
/// goes through here so both sides agree on the location.
pub fn resolve_detail_file_path(detail_path: &str, board_path: &Path) -> PathBuf {
    let detail = Path::new(detail_path);
    if detail.is_absolute() {
        return detail.to_path_buf();
    }

    let base = board_path.parent().unwrap_or_else(|| Path::new(""));
    let joined = base.join(detail);
    let joined = if joined.is_absolute() {
        joined
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(joined),
            Err(_) => joined,
        }
    };
    normalize_lexically(&joined)
}

/// Drop `.` components and fold `..` into its parent without touching the
/// filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolved detail file paths referenced by the board, deduplicated.
pub fn detail_file_paths(board: &Board, board_path: &Path) -> BTreeSet<PathBuf> {
    board
        .tasks()
        .filter_map(|task| task.detail_path.as_deref())
        .filter(|p| !p.is_empty())
        .map(|p| resolve_detail_file_path(p, board_path))
        .collect()
}

/// Parse the contents of a detail file.
pub fn parse_task_detail_markdown(content: &str) -> TaskDetail {
    let content = normalize_newlines(content);
    let mut steps = Vec::new();
    let mut description_lines: Vec<&str> = Vec::new();
    let mut in_steps = false;
    let mut in_description = false;

    for line in content.split('\n') {
        let trimmed = line.trim();

        if in_description {
            if is_fence_close(trimmed) {
                in_description = false;
            } else {
                description_lines.push(strip_description_indent(line));
            }
            continue;
        }

        if is_detail_steps_line(line) {
            in_steps = true;
            continue;
        }

        if in_steps {
            if let Some(step) = step_line(line) {
                steps.push(step);
                continue;
            }
            if trimmed.is_empty() {
                continue;
            }
            in_steps = false;
        }

        if is_detail_description_fence(line) {
            in_description = true;
        }
    }

    let description = description_lines.join("\n");
    let description = description.trim();

    TaskDetail {
        steps: if steps.is_empty() { None } else { Some(steps) },
        description: if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        },
    }
}

/// Render the detail file for a task.
pub fn generate_task_detail_markdown(task: &Task) -> String {
    let header = if task.id.is_empty() { "Task" } else { &task.id };
    let mut out = format!("# {header}\n\n");

    write_steps(&mut out, task.step_list());
    if let Some(description) = task.description.as_deref() {
        write_description(&mut out, description);
    }

    let mut out = out.trim_end().to_string();
    out.push('\n');
    out
}

/// Replace a task's steps and description with what its detail file says.
///
/// `None` means the file could not be read: both fields are cleared, since
/// the board document does not carry them for detail-backed tasks.
pub fn apply_detail(task: &mut Task, content: Option<&str>) {
    let detail = content.map(parse_task_detail_markdown).unwrap_or_default();
    task.steps = detail.steps;
    task.description = detail.description;
}

pub fn read_detail_file(path: &Path) -> Result<String, KanbanError> {
    std::fs::read_to_string(path).map_err(|source| KanbanError::DetailUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Fill every detail-backed task from its detail file, fetched by `read`
/// with the resolved path.
///
/// An unreadable file only blanks that task's steps and description; the
/// rest of the board still loads.
pub fn apply_details<E: fmt::Display>(
    board: &mut Board,
    board_path: &Path,
    mut read: impl FnMut(&Path) -> Result<String, E>,
) {
    for task in board.tasks_mut() {
        let Some(detail_path) = task.detail_path.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let path = resolve_detail_file_path(detail_path, board_path);
        match read(&path) {
            Ok(text) => apply_detail(task, Some(&text)),
            Err(e) => {
                warn!("detail file unreadable: {e}");
                apply_detail(task, None);
            }
        }
    }
}

/// Parse a board and fill in its detail-backed tasks from disk. Reads block.
pub fn parse_markdown_with_details(content: &str, board_path: &Path) -> Board {
    let mut board = parse_markdown(content);
    apply_details(&mut board, board_path, read_detail_file);
    board
}

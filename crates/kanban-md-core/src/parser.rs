use tracing::debug;

use crate::board::{Board, Column, ARCHIVED_MARKER};
use crate::syntax::{
    heading_text, is_description_fence, is_fence_close, is_reserved_bullet, normalize_newlines,
    property_line, step_line, strip_description_indent, strip_title_checkbox,
};
use crate::task::{Priority, Task, Workload};

/// Parse a board document.
///
/// Never fails: lines that match nothing are skipped, or close the task
/// they follow. The accepted layout:
/// ```markdown
/// # Board Title
///
/// ## Column Title [Archived]
///
/// ### Task Title            (or "- Task Title")
///   - id: t1
///   - tags: [a, b]
///   - priority: low
///   - steps:
///       - [ ] open step
///       - [x] finished step
///     ```md
///     free text
///     ```
/// ```
pub fn parse_markdown(content: &str) -> Board {
    let content = normalize_newlines(content);
    let mut parser = Parser::default();

    for line in content.split('\n') {
        // A line that closes a task is examined once more at top level,
        // which cannot ask for another pass.
        if parser.examine(line) == Flow::Reexamine {
            parser.examine(line);
        }
    }

    let board = parser.finish();
    debug!(
        "parsed board '{}': {} columns, {} tasks",
        board.title,
        board.columns.len(),
        board.tasks().count()
    );
    board
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    TopLevel,
    /// Right after a task title: property, step and fence lines belong to the task.
    Properties,
    /// Inside the task's fenced description.
    Description,
    /// Description fence closed; the task ends at the next non-blank line.
    AfterDescription,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Consumed,
    Reexamine,
}

#[derive(Default)]
struct Parser {
    board: Board,
    column: Option<Column>,
    task: Option<Task>,
    description: Vec<String>,
    mode: Mode,
}

impl Parser {
    fn examine(&mut self, line: &str) -> Flow {
        let trimmed = line.trim();

        if self.mode == Mode::Description {
            if is_fence_close(trimmed) {
                self.mode = Mode::AfterDescription;
            } else {
                self.description
                    .push(strip_description_indent(line).to_string());
            }
            return Flow::Consumed;
        }

        if self.board.title.is_empty() {
            if let Some(title) = trimmed.strip_prefix("# ") {
                self.board.title = title.trim().to_string();
                self.close_task();
                return Flow::Consumed;
            }
        }

        if let Some(heading) = heading_text(trimmed, "##") {
            self.close_task();
            self.close_column();
            let (title, archived) = split_archived(heading.trim());
            let mut column = Column::new(title);
            column.archived = archived;
            self.column = Some(column);
            return Flow::Consumed;
        }

        if let Some(title) = task_title(line, trimmed) {
            self.close_task();
            // Tasks before the first column have nowhere to go.
            if self.column.is_some() {
                self.task = Some(Task::new(title));
                self.mode = Mode::Properties;
            }
            return Flow::Consumed;
        }

        if self.mode == Mode::Properties {
            if let Some(task) = self.task.as_mut() {
                if let Some((key, value)) = property_line(line) {
                    apply_property(task, key, value);
                    return Flow::Consumed;
                }
                if let Some(steps) = task.steps.as_mut() {
                    if let Some(step) = step_line(line) {
                        steps.push(step);
                        return Flow::Consumed;
                    }
                }
                if is_description_fence(trimmed) {
                    self.mode = Mode::Description;
                    return Flow::Consumed;
                }
            }
        }

        if trimmed.is_empty() {
            return Flow::Consumed;
        }

        if self.task.is_some() && self.mode != Mode::TopLevel {
            self.close_task();
            return Flow::Reexamine;
        }

        Flow::Consumed
    }

    /// Move the open task, with its trimmed description, into the open column.
    fn close_task(&mut self) {
        self.mode = Mode::TopLevel;
        let lines = std::mem::take(&mut self.description);
        let Some(mut task) = self.task.take() else {
            return;
        };

        let description = lines.join("\n");
        let description = description.trim();
        task.description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };

        if let Some(column) = self.column.as_mut() {
            column.tasks.push(task);
        }
    }

    fn close_column(&mut self) {
        if let Some(column) = self.column.take() {
            self.board.columns.push(column);
        }
    }

    fn finish(mut self) -> Board {
        self.close_task();
        self.close_column();
        self.board
    }
}

/// Strip a trailing `[Archived]` marker (and the whitespace before it).
fn split_archived(heading: &str) -> (String, bool) {
    match heading.strip_suffix(ARCHIVED_MARKER) {
        Some(title) => (title.trim().to_string(), true),
        None => (heading.to_string(), false),
    }
}

/// Title of a `### heading` or of an unindented `- bullet` that is not a
/// reserved property line.
pub(crate) fn task_title(line: &str, trimmed: &str) -> Option<String> {
    if let Some(title) = heading_text(trimmed, "###") {
        return Some(title.trim().to_string());
    }
    let bullet = line.strip_prefix("- ")?;
    if is_reserved_bullet(trimmed) {
        return None;
    }
    Some(strip_title_checkbox(bullet.trim()).trim().to_string())
}

fn apply_property(task: &mut Task, key: &str, value: &str) {
    let text = || {
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    };

    match key {
        "id" => {
            if !value.is_empty() {
                task.id = value.to_string();
            }
        }
        "due" => task.due_date = text(),
        "start" => task.start_date = text(),
        "updated" => task.updated = text(),
        "completed" => task.completed = text(),
        "milestone" => task.milestone = text(),
        "detail" => {
            if !value.is_empty() {
                task.detail_path = Some(value.to_string());
            }
        }
        "tags" => {
            if let Some(tags) = parse_tag_list(value) {
                task.tags = if tags.is_empty() { None } else { Some(tags) };
            }
        }
        "priority" => {
            if let Some(priority) = Priority::from_str(value) {
                task.priority = Some(priority);
            }
        }
        "workload" => {
            if let Some(workload) = Workload::from_str(value) {
                task.workload = Some(workload);
            }
        }
        "defaultExpanded" => task.default_expanded = Some(value.eq_ignore_ascii_case("true")),
        "steps" => task.steps = Some(Vec::new()),
        _ => {}
    }
}

/// `[a, b, c]` → `["a", "b", "c"]`; `None` without brackets.
fn parse_tag_list(value: &str) -> Option<Vec<String>> {
    let start = value.find('[')?;
    let end = value.rfind(']')?;
    if end < start {
        return None;
    }
    Some(
        value[start + 1..end]
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    )
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::KanbanError;
use crate::parser::task_title;
use crate::syntax::{DESCRIPTION_INDENT, FENCE, PROPERTY_PREFIX, STEP_PREFIX};
use crate::task::{Step, Task};

/// How task titles are written. Parsing accepts both forms, so this is a
/// write-side setting only.
///
/// `List` falls back to a `### ` heading for titles a bullet cannot carry:
/// `due: friday` would read back as a property and `[ ] x` would lose its
/// checkbox prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskHeaderFormat {
    /// `### Task title`
    #[default]
    Title,
    /// `- Task title`
    List,
}

impl TaskHeaderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskHeaderFormat::Title => "title",
            TaskHeaderFormat::List => "list",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "title" => Some(TaskHeaderFormat::Title),
            "list" => Some(TaskHeaderFormat::List),
            _ => None,
        }
    }
}

impl std::str::FromStr for TaskHeaderFormat {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskHeaderFormat::from_str(s.trim()).ok_or_else(|| {
            KanbanError::InvalidInput(format!(
                "unknown task header format '{s}' (expected 'title' or 'list')"
            ))
        })
    }
}

impl fmt::Display for TaskHeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a board back into the markdown dialect.
pub fn generate_markdown(board: &Board, format: TaskHeaderFormat) -> String {
    let mut out = String::new();

    if !board.title.is_empty() {
        out.push_str(&format!("# {}\n\n", board.title));
    }

    for column in &board.columns {
        write_heading(&mut out, "##", &column.heading());

        for task in &column.tasks {
            let bullet = format!("- {}", task.title);
            let bullet_reads_back =
                task_title(&bullet, bullet.trim()).as_deref() == Some(task.title.as_str());
            match format {
                TaskHeaderFormat::List if bullet_reads_back => {
                    out.push_str(&bullet);
                    out.push('\n');
                }
                _ => write_heading(&mut out, "###", &task.title),
            }

            write_properties(&mut out, task);

            if !task.has_detail_file() {
                if let Some(description) = task.description.as_deref() {
                    write_description(&mut out, description);
                }
            }

            out.push('\n');
        }
    }

    out
}

/// `## text` plus a blank line; an empty heading is the bare marker.
fn write_heading(out: &mut String, marker: &str, text: &str) {
    if text.is_empty() {
        out.push_str(&format!("{marker}\n\n"));
    } else {
        out.push_str(&format!("{marker} {text}\n\n"));
    }
}

/// Property lines in canonical order. Keep in step with
/// `syntax::PROPERTY_KEYS`, which the parser uses to recognise them.
fn write_properties(out: &mut String, task: &Task) {
    write_property(out, "id", Some(task.id.as_str()));
    if let Some(tags) = task.tags.as_deref().filter(|t| !t.is_empty()) {
        write_property(out, "tags", Some(format!("[{}]", tags.join(", ")).as_str()));
    }
    write_property(out, "priority", task.priority.map(|p| p.as_str()));
    write_property(out, "workload", task.workload.map(|w| w.as_str()));
    write_property(out, "updated", task.updated.as_deref());
    write_property(out, "completed", task.completed.as_deref());
    write_property(out, "milestone", task.milestone.as_deref());
    write_property(out, "start", task.start_date.as_deref());
    write_property(out, "due", task.due_date.as_deref());
    write_property(out, "detail", task.detail_path.as_deref());
    if let Some(expanded) = task.default_expanded {
        write_property(out, "defaultExpanded", Some(if expanded { "true" } else { "false" }));
    }
    // Steps of detail-backed tasks live in the detail file only.
    if !task.has_detail_file() {
        write_steps(out, task.step_list());
    }
}

/// `  - key: value`, skipped when the value is absent or empty.
fn write_property(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        out.push_str(&format!("{PROPERTY_PREFIX}{key}: {value}\n"));
    }
}

pub(crate) fn write_steps(out: &mut String, steps: &[Step]) {
    if steps.is_empty() {
        return;
    }
    out.push_str(&format!("{PROPERTY_PREFIX}steps:\n"));
    for step in steps {
        out.push_str(&format!("{STEP_PREFIX}{} {}\n", step.checkbox(), step.text));
    }
}

/// Indented ```` ```md ```` block, skipped when the text is blank.
pub(crate) fn write_description(out: &mut String, description: &str) {
    let description = description.trim();
    if description.is_empty() {
        return;
    }
    out.push_str(&format!("{DESCRIPTION_INDENT}{FENCE}md\n"));
    for line in description.split('\n') {
        out.push_str(&format!("{DESCRIPTION_INDENT}{line}\n"));
    }
    out.push_str(&format!("{DESCRIPTION_INDENT}{FENCE}\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;
    use crate::task::{Priority, Workload};

    fn board_with(task: Task) -> Board {
        let mut column = Column::new("Todo");
        column.tasks.push(task);
        Board {
            title: "P".into(),
            columns: vec![column],
        }
    }

    #[test]
    fn title_format_layout() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "Buy milk".into(),
            priority: Some(Priority::Low),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::Title);
        assert_eq!(
            md,
            "# P\n\n## Todo\n\n### Buy milk\n\n  - id: t1\n  - priority: low\n\n"
        );
    }

    #[test]
    fn list_format_layout() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "Buy milk".into(),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::List);
        assert_eq!(md, "# P\n\n## Todo\n\n- Buy milk\n  - id: t1\n\n");
    }

    #[test]
    fn properties_follow_canonical_order() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "T".into(),
            due_date: Some("2025-01-10".into()),
            start_date: Some("2025-01-01".into()),
            milestone: Some("M1".into()),
            completed: Some("2025-01-09".into()),
            updated: Some("2025-01-08".into()),
            workload: Some(Workload::Extreme),
            priority: Some(Priority::Medium),
            tags: Some(vec!["a".into(), "b".into()]),
            default_expanded: Some(false),
            steps: Some(vec![Step::new("one", false), Step::new("two", true)]),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::List);
        let expected = "\
- T
  - id: t1
  - tags: [a, b]
  - priority: medium
  - workload: Extreme
  - updated: 2025-01-08
  - completed: 2025-01-09
  - milestone: M1
  - start: 2025-01-01
  - due: 2025-01-10
  - defaultExpanded: false
  - steps:
      - [ ] one
      - [x] two

";
        assert!(md.ends_with(expected), "got:\n{md}");
    }

    #[test]
    fn empty_strings_are_suppressed() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "T".into(),
            due_date: Some(String::new()),
            tags: Some(vec![]),
            steps: Some(vec![]),
            description: Some("   ".into()),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::List);
        assert!(!md.contains("due:"));
        assert!(!md.contains("tags:"));
        assert!(!md.contains("steps:"));
        assert!(!md.contains("```"));
    }

    #[test]
    fn detail_backed_task_omits_steps_and_description() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "T".into(),
            detail_path: Some("details/t1.md".into()),
            steps: Some(vec![Step::new("one", false)]),
            description: Some("body".into()),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::Title);
        assert!(md.contains("  - detail: details/t1.md\n"));
        assert!(!md.contains("steps:"));
        assert!(!md.contains("body"));
    }

    #[test]
    fn description_is_fenced_and_indented() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "T".into(),
            description: Some("\nfirst\n  second\n".into()),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::List);
        assert!(md.ends_with("  - id: t1\n    ```md\n    first\n      second\n    ```\n\n"));
    }

    #[test]
    fn blank_description_lines_keep_indent() {
        let board = board_with(Task {
            id: "t1".into(),
            title: "T".into(),
            description: Some("one\n\ntwo".into()),
            ..Default::default()
        });
        let md = generate_markdown(&board, TaskHeaderFormat::List);
        assert!(md.contains("    ```md\n    one\n    \n    two\n    ```\n"));
    }

    #[test]
    fn empty_titles_use_bare_markers() {
        let mut board = board_with(Task {
            id: "t1".into(),
            title: String::new(),
            ..Default::default()
        });
        board.title.clear();
        board.columns[0].title.clear();
        assert_eq!(
            generate_markdown(&board, TaskHeaderFormat::Title),
            "##\n\n###\n\n  - id: t1\n\n"
        );
        assert_eq!(
            generate_markdown(&board, TaskHeaderFormat::List),
            "##\n\n- \n  - id: t1\n\n"
        );
    }

    #[test]
    fn list_format_falls_back_to_heading_for_ambiguous_titles() {
        for title in ["due: friday", "[ ] boxed", "[x] ticked"] {
            let board = board_with(Task {
                id: "t1".into(),
                title: title.into(),
                ..Default::default()
            });
            let md = generate_markdown(&board, TaskHeaderFormat::List);
            assert!(md.contains(&format!("### {title}\n\n")), "{md}");
        }
    }

    #[test]
    fn archived_column_heading() {
        let mut board = board_with(Task::new("T"));
        board.columns[0].archived = true;
        let md = generate_markdown(&board, TaskHeaderFormat::Title);
        assert!(md.contains("## Todo [Archived]\n"));
    }

    #[test]
    fn untitled_board_has_no_title_line() {
        let board = Board {
            title: String::new(),
            columns: vec![Column::new("Only")],
        };
        assert_eq!(generate_markdown(&board, TaskHeaderFormat::Title), "## Only\n\n");
    }

    #[test]
    fn header_format_parses_from_config_strings() {
        assert_eq!("list".parse::<TaskHeaderFormat>().unwrap(), TaskHeaderFormat::List);
        assert_eq!(" title ".parse::<TaskHeaderFormat>().unwrap(), TaskHeaderFormat::Title);
        assert!(matches!(
            "heading".parse::<TaskHeaderFormat>(),
            Err(KanbanError::InvalidInput(_))
        ));
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Column};
use crate::task::TaskDraft;

/// One editor action against an open board.
///
/// A missing column, task or step makes the operation a no-op; nothing is
/// reported as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOp {
    MoveTask {
        task_id: String,
        from_column_id: String,
        to_column_id: String,
        new_index: usize,
    },
    AddTask {
        column_id: String,
        draft: TaskDraft,
    },
    DeleteTask {
        task_id: String,
        column_id: String,
    },
    EditTask {
        task_id: String,
        column_id: String,
        draft: TaskDraft,
    },
    AddColumn {
        title: String,
    },
    MoveColumn {
        from_index: usize,
        to_index: usize,
    },
    UpdateTaskStep {
        task_id: String,
        column_id: String,
        step_index: usize,
        completed: bool,
    },
    ReorderTaskSteps {
        task_id: String,
        column_id: String,
        new_order: Vec<usize>,
    },
    ToggleColumnArchive {
        column_id: String,
        archived: bool,
    },
}

impl EditOp {
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::MoveTask { .. } => "moveTask",
            EditOp::AddTask { .. } => "addTask",
            EditOp::DeleteTask { .. } => "deleteTask",
            EditOp::EditTask { .. } => "editTask",
            EditOp::AddColumn { .. } => "addColumn",
            EditOp::MoveColumn { .. } => "moveColumn",
            EditOp::UpdateTaskStep { .. } => "updateTaskStep",
            EditOp::ReorderTaskSteps { .. } => "reorderTaskSteps",
            EditOp::ToggleColumnArchive { .. } => "toggleColumnArchive",
        }
    }
}

/// What applying an [`EditOp`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub changed: bool,
    /// Id of a task whose detail file has to be rewritten.
    pub sidecar_task: Option<String>,
}

impl EditOutcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            sidecar_task: None,
        }
    }

    fn with_sidecar(task_id: &str, has_detail_file: bool) -> Self {
        Self {
            changed: true,
            sidecar_task: has_detail_file.then(|| task_id.to_string()),
        }
    }
}

impl Board {
    /// Apply one edit in place.
    pub fn apply(&mut self, op: EditOp) -> EditOutcome {
        let name = op.name();
        let outcome = match op {
            EditOp::MoveTask {
                task_id,
                from_column_id,
                to_column_id,
                new_index,
            } => self.move_task(&task_id, &from_column_id, &to_column_id, new_index),
            EditOp::AddTask { column_id, draft } => match self.column_mut(&column_id) {
                Some(column) => {
                    column.tasks.push(draft.into_task());
                    EditOutcome::changed()
                }
                None => EditOutcome::unchanged(),
            },
            EditOp::DeleteTask { task_id, column_id } => {
                match self.column_mut(&column_id) {
                    Some(column) => match column.tasks.iter().position(|t| t.id == task_id) {
                        Some(index) => {
                            column.tasks.remove(index);
                            EditOutcome::changed()
                        }
                        None => EditOutcome::unchanged(),
                    },
                    None => EditOutcome::unchanged(),
                }
            }
            EditOp::EditTask {
                task_id,
                column_id,
                draft,
            } => match self.task_mut(&column_id, &task_id) {
                Some(task) => {
                    draft.apply_to(task);
                    EditOutcome::with_sidecar(&task.id, task.has_detail_file())
                }
                None => EditOutcome::unchanged(),
            },
            EditOp::AddColumn { title } => {
                self.columns.push(Column::new(title));
                EditOutcome::changed()
            }
            EditOp::MoveColumn {
                from_index,
                to_index,
            } => {
                let len = self.columns.len();
                if from_index == to_index || from_index >= len || to_index >= len {
                    EditOutcome::unchanged()
                } else {
                    let column = self.columns.remove(from_index);
                    self.columns.insert(to_index, column);
                    EditOutcome::changed()
                }
            }
            EditOp::UpdateTaskStep {
                task_id,
                column_id,
                step_index,
                completed,
            } => {
                let Some(task) = self.task_mut(&column_id, &task_id) else {
                    return EditOutcome::unchanged();
                };
                match task.steps.as_mut().and_then(|s| s.get_mut(step_index)) {
                    Some(step) => {
                        step.completed = completed;
                        EditOutcome::with_sidecar(&task.id, task.has_detail_file())
                    }
                    None => EditOutcome::unchanged(),
                }
            }
            EditOp::ReorderTaskSteps {
                task_id,
                column_id,
                new_order,
            } => {
                let Some(task) = self.task_mut(&column_id, &task_id) else {
                    return EditOutcome::unchanged();
                };
                let Some(steps) = task.steps.as_ref() else {
                    return EditOutcome::unchanged();
                };
                let reordered: Vec<_> = new_order
                    .iter()
                    .filter_map(|&index| steps.get(index).cloned())
                    .collect();
                task.steps = Some(reordered);
                EditOutcome::with_sidecar(&task.id, task.has_detail_file())
            }
            EditOp::ToggleColumnArchive {
                column_id,
                archived,
            } => match self.column_mut(&column_id) {
                Some(column) => {
                    column.archived = archived;
                    EditOutcome::changed()
                }
                None => EditOutcome::unchanged(),
            },
        };

        debug!(op = name, changed = outcome.changed, "applied edit");
        outcome
    }

    fn move_task(
        &mut self,
        task_id: &str,
        from_column_id: &str,
        to_column_id: &str,
        new_index: usize,
    ) -> EditOutcome {
        if self.column(to_column_id).is_none() {
            return EditOutcome::unchanged();
        }
        let Some(from) = self.column_mut(from_column_id) else {
            return EditOutcome::unchanged();
        };
        let Some(index) = from.tasks.iter().position(|t| t.id == task_id) else {
            return EditOutcome::unchanged();
        };
        let task = from.tasks.remove(index);

        let Some(to) = self.column_mut(to_column_id) else {
            return EditOutcome::unchanged();
        };
        let at = new_index.min(to.tasks.len());
        to.tasks.insert(at, task);
        EditOutcome::changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Step, Task};

    fn board() -> Board {
        let mut todo = Column::new("Todo");
        todo.tasks.push(Task {
            id: "a".into(),
            title: "A".into(),
            steps: Some(vec![
                Step::new("one", false),
                Step::new("two", true),
                Step::new("three", false),
            ]),
            ..Default::default()
        });
        todo.tasks.push(Task {
            id: "b".into(),
            title: "B".into(),
            detail_path: Some("details/b.md".into()),
            steps: Some(vec![Step::new("only", false)]),
            ..Default::default()
        });
        let done = Column::new("Done");
        Board {
            title: "P".into(),
            columns: vec![todo, done],
        }
    }

    fn ids(board: &Board) -> (String, String) {
        (board.columns[0].id.clone(), board.columns[1].id.clone())
    }

    #[test]
    fn move_task_between_columns_clamps_index() {
        let mut board = board();
        let (todo, done) = ids(&board);
        let outcome = board.apply(EditOp::MoveTask {
            task_id: "a".into(),
            from_column_id: todo.clone(),
            to_column_id: done.clone(),
            new_index: 99,
        });
        assert!(outcome.changed);
        assert_eq!(board.columns[0].tasks.len(), 1);
        assert_eq!(board.columns[1].tasks[0].id, "a");
    }

    #[test]
    fn move_task_within_column() {
        let mut board = board();
        let (todo, _) = ids(&board);
        board.apply(EditOp::MoveTask {
            task_id: "b".into(),
            from_column_id: todo.clone(),
            to_column_id: todo,
            new_index: 0,
        });
        let order: Vec<_> = board.columns[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn move_task_to_unknown_column_keeps_task() {
        let mut board = board();
        let (todo, _) = ids(&board);
        let outcome = board.apply(EditOp::MoveTask {
            task_id: "a".into(),
            from_column_id: todo,
            to_column_id: "nope".into(),
            new_index: 0,
        });
        assert!(!outcome.changed);
        assert_eq!(board.columns[0].tasks.len(), 2);
    }

    #[test]
    fn add_and_delete_task() {
        let mut board = board();
        let (_, done) = ids(&board);
        let outcome = board.apply(EditOp::AddTask {
            column_id: done.clone(),
            draft: TaskDraft::new("New"),
        });
        assert!(outcome.changed);
        let new_id = board.columns[1].tasks[0].id.clone();
        assert_eq!(new_id.len(), 9);

        board.apply(EditOp::DeleteTask {
            task_id: new_id,
            column_id: done.clone(),
        });
        assert!(board.columns[1].tasks.is_empty());

        let outcome = board.apply(EditOp::DeleteTask {
            task_id: "missing".into(),
            column_id: done,
        });
        assert_eq!(outcome, EditOutcome::default());
    }

    #[test]
    fn edit_task_flags_sidecar_only_for_detail_backed_tasks() {
        let mut board = board();
        let (todo, _) = ids(&board);

        let outcome = board.apply(EditOp::EditTask {
            task_id: "a".into(),
            column_id: todo.clone(),
            draft: TaskDraft::new("Renamed"),
        });
        assert!(outcome.changed);
        assert_eq!(outcome.sidecar_task, None);
        assert_eq!(board.columns[0].tasks[0].title, "Renamed");

        let mut draft = TaskDraft::new("B2");
        draft.start_date = Some(" ".into());
        draft.due_date = Some(" 2025-06-01".into());
        let outcome = board.apply(EditOp::EditTask {
            task_id: "b".into(),
            column_id: todo,
            draft,
        });
        assert_eq!(outcome.sidecar_task.as_deref(), Some("b"));
        let task = &board.columns[0].tasks[1];
        assert_eq!(task.start_date, None);
        assert_eq!(task.due_date.as_deref(), Some("2025-06-01"));
        assert_eq!(task.detail_path.as_deref(), Some("details/b.md"));
    }

    #[test]
    fn add_and_move_columns() {
        let mut board = board();
        board.apply(EditOp::AddColumn {
            title: "Later".into(),
        });
        assert_eq!(board.columns[2].title, "Later");
        assert!(!board.columns[2].archived);

        board.apply(EditOp::MoveColumn {
            from_index: 2,
            to_index: 0,
        });
        let titles: Vec<_> = board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Later", "Todo", "Done"]);

        let outcome = board.apply(EditOp::MoveColumn {
            from_index: 5,
            to_index: 0,
        });
        assert!(!outcome.changed);
        assert_eq!(board.columns.len(), 3);
    }

    #[test]
    fn update_step_ignores_out_of_range() {
        let mut board = board();
        let (todo, _) = ids(&board);
        let outcome = board.apply(EditOp::UpdateTaskStep {
            task_id: "a".into(),
            column_id: todo.clone(),
            step_index: 0,
            completed: true,
        });
        assert!(outcome.changed);
        assert!(board.columns[0].tasks[0].step_list()[0].completed);

        let outcome = board.apply(EditOp::UpdateTaskStep {
            task_id: "a".into(),
            column_id: todo.clone(),
            step_index: 3,
            completed: true,
        });
        assert!(!outcome.changed);

        let outcome = board.apply(EditOp::UpdateTaskStep {
            task_id: "b".into(),
            column_id: todo,
            step_index: 0,
            completed: true,
        });
        assert_eq!(outcome.sidecar_task.as_deref(), Some("b"));
    }

    #[test]
    fn reorder_steps_drops_out_of_range_indices() {
        let mut board = board();
        let (todo, _) = ids(&board);
        board.apply(EditOp::ReorderTaskSteps {
            task_id: "a".into(),
            column_id: todo,
            new_order: vec![2, 7, 0],
        });
        let texts: Vec<_> = board.columns[0].tasks[0]
            .step_list()
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(texts, vec!["three", "one"]);
    }

    #[test]
    fn toggle_column_archive() {
        let mut board = board();
        let (_, done) = ids(&board);
        board.apply(EditOp::ToggleColumnArchive {
            column_id: done.clone(),
            archived: true,
        });
        assert!(board.columns[1].archived);
        board.apply(EditOp::ToggleColumnArchive {
            column_id: done,
            archived: false,
        });
        assert!(!board.columns[1].archived);
    }

    #[test]
    fn ops_deserialize_from_message_json() {
        let op: EditOp = serde_json::from_str(
            r#"{"type":"reorderTaskSteps","taskId":"a","columnId":"c","newOrder":[1,0]}"#,
        )
        .unwrap();
        assert!(matches!(
            op,
            EditOp::ReorderTaskSteps { ref new_order, .. } if new_order == &vec![1, 0]
        ));
    }
}

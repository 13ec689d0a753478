use std::sync::Arc;

use anyhow::{bail, Context, Result};
use kanban_md_core::{generate_task_detail_markdown, EditOp, Step, TaskDraft};
use kanban_md_service::BoardDocument;
use kanban_md_store::{LocalStore, TextStore};
use serde_json::json;
use tracing::info;

use crate::config::{Cli, Command};

/// What a command prints and whether it succeeded.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub success: bool,
}

impl Output {
    fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            success: true,
        }
    }
}

pub async fn run(cli: Cli) -> Result<Output> {
    run_with_store(cli, Arc::new(LocalStore::new())).await
}

pub async fn run_with_store(cli: Cli, store: Arc<dyn TextStore>) -> Result<Output> {
    let board_path = cli.command.board().clone();
    let mut doc = BoardDocument::open(store.clone(), board_path.clone(), cli.task_header)
        .await
        .with_context(|| format!("open {}", board_path.display()))?;

    let op = match cli.command {
        Command::Show { .. } => {
            return Ok(Output::ok(serde_json::to_string_pretty(doc.board())?));
        }
        Command::Roadmap { .. } => {
            let view = json!({
                "title": doc.board().title,
                "tasks": doc.roadmap(),
            });
            return Ok(Output::ok(serde_json::to_string_pretty(&view)?));
        }
        Command::Detail { task_id, .. } => {
            let (_, task) = doc
                .board()
                .find_task(&task_id)
                .with_context(|| format!("no task with id {task_id}"))?;
            return Ok(Output::ok(generate_task_detail_markdown(task)));
        }
        Command::Fmt { check, .. } => {
            let current = store.get(&board_path).await?;
            let formatted = doc.markdown();
            if current == formatted {
                return Ok(Output::ok(""));
            }
            if check {
                return Ok(Output {
                    stdout: format!("{} is not formatted\n", board_path.display()),
                    success: false,
                });
            }
            doc.save().await?;
            info!("formatted {}", board_path.display());
            return Ok(Output::ok(""));
        }
        Command::AddColumn { title, .. } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                bail!("column title must not be blank");
            }
            EditOp::AddColumn { title }
        }
        Command::MoveColumn { from, to, .. } => {
            let len = doc.board().columns.len();
            if from >= len || to >= len {
                bail!("column index out of range (board has {len} columns)");
            }
            EditOp::MoveColumn {
                from_index: from,
                to_index: to,
            }
        }
        Command::AddTask {
            column,
            title,
            description,
            tags,
            priority,
            workload,
            start,
            due,
            steps,
            ..
        } => EditOp::AddTask {
            column_id: doc.column_id(&column)?,
            draft: TaskDraft {
                title,
                description,
                tags,
                priority,
                workload,
                start_date: start,
                due_date: due,
                default_expanded: None,
                steps: steps.into_iter().map(|s| Step::new(s, false)).collect(),
            },
        },
        Command::MoveTask {
            task_id, to, index, ..
        } => EditOp::MoveTask {
            from_column_id: doc.column_of_task(&task_id)?,
            to_column_id: doc.column_id(&to)?,
            new_index: index.unwrap_or(usize::MAX),
            task_id,
        },
        Command::DeleteTask { task_id, .. } => EditOp::DeleteTask {
            column_id: doc.column_of_task(&task_id)?,
            task_id,
        },
        Command::Step { task_id, index, .. } => {
            let (column, task) = doc
                .board()
                .find_task(&task_id)
                .with_context(|| format!("no task with id {task_id}"))?;
            let Some(step) = task.step_list().get(index) else {
                bail!("task {task_id} has no step {index}");
            };
            EditOp::UpdateTaskStep {
                column_id: column.id.clone(),
                completed: !step.completed,
                step_index: index,
                task_id,
            }
        }
        Command::ReorderSteps {
            task_id, order, ..
        } => EditOp::ReorderTaskSteps {
            column_id: doc.column_of_task(&task_id)?,
            task_id,
            new_order: order,
        },
        Command::Archive { column, .. } => EditOp::ToggleColumnArchive {
            column_id: doc.column_id(&column)?,
            archived: true,
        },
        Command::Unarchive { column, .. } => EditOp::ToggleColumnArchive {
            column_id: doc.column_id(&column)?,
            archived: false,
        },
    };

    let name = op.name();
    let outcome = doc.apply(op).await?;
    info!(
        "{name}: {}",
        if outcome.changed { "saved" } else { "no change" }
    );
    Ok(Output::ok(""))
}

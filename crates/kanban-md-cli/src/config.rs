use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kanban_md_core::{Priority, TaskHeaderFormat, Workload};

#[derive(Debug, Parser)]
#[command(name = "kanban-md", about = "Inspect and edit markdown kanban boards")]
pub struct Cli {
    /// How task titles are written: `title` (### heading) or `list` (- bullet)
    #[arg(
        long,
        global = true,
        env = "KANBAN_MD_TASK_HEADER",
        default_value = "title"
    )]
    pub task_header: TaskHeaderFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the board, with detail files applied, as JSON
    Show { board: PathBuf },

    /// Rewrite the board in canonical form
    Fmt {
        board: PathBuf,

        /// Only report whether the file would change; exit non-zero if so
        #[arg(long)]
        check: bool,
    },

    /// Print the roadmap view of the board as JSON
    Roadmap { board: PathBuf },

    /// Print the detail file a task would have
    Detail { board: PathBuf, task_id: String },

    /// Append an empty column
    AddColumn { board: PathBuf, title: String },

    /// Move a column to another position (0-based)
    MoveColumn {
        board: PathBuf,
        from: usize,
        to: usize,
    },

    /// Append a task to a column
    AddTask {
        board: PathBuf,

        /// Title of the column to add to
        #[arg(long)]
        column: String,

        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_workload)]
        workload: Option<Workload>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        due: Option<String>,

        /// Repeatable; each becomes an open step
        #[arg(long = "step")]
        steps: Vec<String>,
    },

    /// Move a task to a column, at the end unless --index is given
    MoveTask {
        board: PathBuf,
        task_id: String,

        /// Title of the destination column
        #[arg(long)]
        to: String,

        #[arg(long)]
        index: Option<usize>,
    },

    DeleteTask { board: PathBuf, task_id: String },

    /// Toggle one step of a task (0-based index)
    Step {
        board: PathBuf,
        task_id: String,
        index: usize,
    },

    /// Reorder a task's steps, e.g. `reorder-steps board.md t1 2 0 1`
    ReorderSteps {
        board: PathBuf,
        task_id: String,
        #[arg(required = true)]
        order: Vec<usize>,
    },

    /// Mark a column archived
    Archive { board: PathBuf, column: String },

    /// Clear a column's archived mark
    Unarchive { board: PathBuf, column: String },
}

impl Command {
    pub fn board(&self) -> &PathBuf {
        match self {
            Command::Show { board }
            | Command::Fmt { board, .. }
            | Command::Roadmap { board }
            | Command::Detail { board, .. }
            | Command::AddColumn { board, .. }
            | Command::MoveColumn { board, .. }
            | Command::AddTask { board, .. }
            | Command::MoveTask { board, .. }
            | Command::DeleteTask { board, .. }
            | Command::Step { board, .. }
            | Command::ReorderSteps { board, .. }
            | Command::Archive { board, .. }
            | Command::Unarchive { board, .. } => board,
        }
    }
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(s).ok_or_else(|| {
        let all: Vec<_> = Priority::ALL.iter().map(|p| p.as_str()).collect();
        format!("expected one of: {}", all.join(", "))
    })
}

fn parse_workload(s: &str) -> Result<Workload, String> {
    Workload::from_str(s).ok_or_else(|| {
        let all: Vec<_> = Workload::ALL.iter().map(|w| w.as_str()).collect();
        format!("expected one of: {}", all.join(", "))
    })
}

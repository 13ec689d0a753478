pub mod board;
pub mod detail;
pub mod edit;
pub mod error;
pub mod generator;
pub mod parser;
pub mod roadmap;
pub mod syntax;
pub mod task;

pub use board::{Board, Column};
pub use detail::{
    apply_detail, apply_details, detail_file_paths, generate_task_detail_markdown, parse_markdown_with_details,
    parse_task_detail_markdown, resolve_detail_file_path, TaskDetail,
};
pub use edit::{EditOp, EditOutcome};
pub use error::KanbanError;
pub use generator::{generate_markdown, TaskHeaderFormat};
pub use parser::parse_markdown;
pub use roadmap::{roadmap_tasks, RoadmapTask};
pub use task::{Priority, Step, Task, TaskDraft, Workload};

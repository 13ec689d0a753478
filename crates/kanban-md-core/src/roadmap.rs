use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::task::Task;

/// Flat, timeline-oriented view of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapTask {
    pub id: String,
    pub title: String,
    /// Title of the column holding the task.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_path: Option<String>,
}

/// Every task on the board in document order.
pub fn roadmap_tasks(board: &Board) -> Vec<RoadmapTask> {
    board
        .columns
        .iter()
        .flat_map(|column| {
            column.tasks.iter().map(move |task| RoadmapTask {
                id: task.id.clone(),
                title: task.title.clone(),
                status: column.title.clone(),
                milestone: task.milestone.clone(),
                start_date: task.start_date.clone(),
                due_date: task.due_date.clone(),
                completed_date: task.completed.clone(),
                updated_date: task.updated.clone(),
                progress: progress(task, &column.title),
                detail_path: task.detail_path.clone(),
            })
        })
        .collect()
}

/// 1.0 in a "done" column, else the share of completed steps.
pub fn progress(task: &Task, status: &str) -> f64 {
    if status.trim().eq_ignore_ascii_case("done") {
        return 1.0;
    }
    let steps = task.step_list();
    if steps.is_empty() {
        return 0.0;
    }
    let completed = steps.iter().filter(|s| s.completed).count();
    completed as f64 / steps.len() as f64
}

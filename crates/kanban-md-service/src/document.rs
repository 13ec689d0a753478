use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kanban_md_core::{
    apply_details, detail_file_paths, generate_markdown, generate_task_detail_markdown,
    parse_markdown, resolve_detail_file_path, roadmap_tasks, Board, EditOp, EditOutcome,
    RoadmapTask, TaskHeaderFormat,
};
use kanban_md_store::TextStore;
use tracing::{debug, info};

use crate::ServiceError;

/// An open board file together with the detail files it references.
///
/// Every edit goes through [`BoardDocument::apply`], which regenerates the
/// board text and writes it back, plus the affected detail file when the
/// edited task has one.
pub struct BoardDocument {
    store: Arc<dyn TextStore>,
    board_path: PathBuf,
    header_format: TaskHeaderFormat,
    board: Board,
    detail_paths: BTreeSet<PathBuf>,
}

impl BoardDocument {
    /// Read and parse the board, then fill in detail-backed tasks.
    pub async fn open(
        store: Arc<dyn TextStore>,
        board_path: impl Into<PathBuf>,
        header_format: TaskHeaderFormat,
    ) -> Result<Self, ServiceError> {
        let board_path = board_path.into();
        let text = store.get(&board_path).await?;
        let board = load_board(store.as_ref(), &text, &board_path).await;
        let detail_paths = detail_file_paths(&board, &board_path);
        info!(
            "opened {}: {} columns, {} detail files",
            board_path.display(),
            board.columns.len(),
            detail_paths.len()
        );
        Ok(Self {
            store,
            board_path,
            header_format,
            board,
            detail_paths,
        })
    }

    /// Re-read the board and its detail files, replacing the in-memory board.
    pub async fn reload(&mut self) -> Result<(), ServiceError> {
        let text = self.store.get(&self.board_path).await?;
        self.board = load_board(self.store.as_ref(), &text, &self.board_path).await;
        self.detail_paths = detail_file_paths(&self.board, &self.board_path);
        debug!("reloaded {}", self.board_path.display());
        Ok(())
    }

    /// Apply an edit and persist the result.
    ///
    /// Unchanged boards are not written.
    pub async fn apply(&mut self, op: EditOp) -> Result<EditOutcome, ServiceError> {
        let outcome = self.board.apply(op);
        if !outcome.changed {
            return Ok(outcome);
        }

        self.save().await?;
        if let Some(task_id) = outcome.sidecar_task.as_deref() {
            self.save_detail(task_id).await?;
        }
        Ok(outcome)
    }

    /// Write the board in canonical form.
    pub async fn save(&mut self) -> Result<(), ServiceError> {
        let text = self.markdown();
        self.store.put(&self.board_path, &text).await?;
        self.detail_paths = detail_file_paths(&self.board, &self.board_path);
        Ok(())
    }

    /// Write the detail file of one task from its current steps and
    /// description.
    pub async fn save_detail(&self, task_id: &str) -> Result<(), ServiceError> {
        let (_, task) = self
            .board
            .find_task(task_id)
            .ok_or_else(|| ServiceError::NotFound(format!("task {task_id}")))?;
        let Some(detail_path) = task.detail_path.as_deref().filter(|p| !p.is_empty()) else {
            return Err(ServiceError::InvalidInput(format!(
                "task {task_id} has no detail file"
            )));
        };
        let path = resolve_detail_file_path(detail_path, &self.board_path);
        self.store
            .put(&path, &generate_task_detail_markdown(task))
            .await?;
        debug!("saved detail file {}", path.display());
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board as it would be written now.
    pub fn markdown(&self) -> String {
        generate_markdown(&self.board, self.header_format)
    }

    pub fn roadmap(&self) -> Vec<RoadmapTask> {
        roadmap_tasks(&self.board)
    }

    /// Resolved paths of every detail file the board references.
    pub fn detail_paths(&self) -> &BTreeSet<PathBuf> {
        &self.detail_paths
    }

    /// Whether `path` is one of this board's detail files. Compares resolved
    /// paths as returned by [`BoardDocument::detail_paths`].
    pub fn is_detail_file(&self, path: &Path) -> bool {
        self.detail_paths.contains(path)
    }

    /// Id of the first column titled `title`.
    pub fn column_id(&self, title: &str) -> Result<String, ServiceError> {
        self.board
            .column_by_title(title)
            .map(|c| c.id.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("column '{title}'")))
    }

    /// Id of the column holding `task_id`.
    pub fn column_of_task(&self, task_id: &str) -> Result<String, ServiceError> {
        self.board
            .find_task(task_id)
            .map(|(column, _)| column.id.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("task {task_id}")))
    }
}

/// Parse board text and apply each task's detail file read through `store`.
async fn load_board(store: &dyn TextStore, text: &str, board_path: &Path) -> Board {
    let mut board = parse_markdown(text);

    let mut files = BTreeMap::new();
    for path in detail_file_paths(&board, board_path) {
        let read = store.get(&path).await;
        files.insert(path, read);
    }

    apply_details(&mut board, board_path, |path| match files.get(path) {
        Some(Ok(text)) => Ok(text.clone()),
        Some(Err(e)) => Err(format!("{}: {e}", path.display())),
        None => Err(format!("{}: not read", path.display())),
    });
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_md_store::LocalStore;

    async fn open(dir: &Path, text: &str) -> BoardDocument {
        let board_path = dir.join("board.md");
        std::fs::write(&board_path, text).unwrap();
        BoardDocument::open(Arc::new(LocalStore::new()), board_path, TaskHeaderFormat::List)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_missing_board_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let result = BoardDocument::open(
            Arc::new(LocalStore::new()),
            tmp.path().join("absent.md"),
            TaskHeaderFormat::Title,
        )
        .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn unchanged_edit_does_not_write() {
        let tmp = tempfile::tempdir().unwrap();
        let original = "## Todo\n- A\n  - id: a\n";
        let mut doc = open(tmp.path(), original).await;
        let column_id = doc.column_id("Todo").unwrap();

        let outcome = doc
            .apply(EditOp::DeleteTask {
                task_id: "zzz".into(),
                column_id,
            })
            .await
            .unwrap();
        assert!(!outcome.changed);
        let on_disk = std::fs::read_to_string(tmp.path().join("board.md")).unwrap();
        assert_eq!(on_disk, original);
    }

    #[tokio::test]
    async fn column_lookup_by_title() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = open(tmp.path(), "## Todo\n- A\n  - id: a\n## Done\n").await;
        assert_eq!(doc.column_id("Todo").unwrap(), doc.board().columns[0].id);
        assert_eq!(doc.column_of_task("a").unwrap(), doc.board().columns[0].id);
        assert!(matches!(doc.column_id("Later"), Err(ServiceError::NotFound(_))));
        assert!(matches!(doc.column_of_task("b"), Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn detail_paths_are_resolved_against_board() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = open(
            tmp.path(),
            "## Todo\n- A\n  - id: a\n  - detail: details/a.md\n- B\n  - id: b\n",
        )
        .await;
        let expected = tmp.path().join("details/a.md");
        assert_eq!(doc.detail_paths().len(), 1);
        assert!(doc.is_detail_file(&expected));
        assert!(!doc.is_detail_file(&tmp.path().join("board.md")));
    }

    #[tokio::test]
    async fn tasks_sharing_a_detail_file_both_load_it() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("shared.md"),
            "# a\n\n  - steps:\n      - [x] common\n",
        )
        .unwrap();
        let doc = open(
            tmp.path(),
            "## Todo\n- A\n  - id: a\n  - detail: shared.md\n- B\n  - id: b\n  - detail: ./shared.md\n",
        )
        .await;
        for task in &doc.board().columns[0].tasks {
            assert_eq!(task.step_list().len(), 1, "task {}", task.id);
            assert!(task.step_list()[0].completed);
        }
    }

    #[tokio::test]
    async fn save_detail_requires_detail_path() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = open(tmp.path(), "## Todo\n- A\n  - id: a\n").await;
        assert!(matches!(
            doc.save_detail("a").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            doc.save_detail("missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}

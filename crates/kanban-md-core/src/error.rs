use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("detail file unreadable: {}: {source}", path.display())]
    DetailUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

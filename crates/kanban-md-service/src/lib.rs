mod document;
mod error;
mod shared;

pub use document::BoardDocument;
pub use error::ServiceError;
pub use shared::SharedDocument;

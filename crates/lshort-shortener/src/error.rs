use lshort_core::LinkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("blocking store task failed: {0}")]
    Task(String),
    #[error("store is still shared by {0} other handle(s)")]
    StoreInUse(usize),
}

impl ShortenerError {
    /// Returns `true` if the error is a lookup miss rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShortenerError::Link(err) if err.is_not_found())
    }
}

impl From<tokio::task::JoinError> for ShortenerError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Task(value.to_string())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("lock backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("lock name must not be empty")]
    EmptyName,
}

pub type Result<T> = std::result::Result<T, LockError>;

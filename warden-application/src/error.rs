use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("game already registered: {0}")]
    DuplicateGame(String),
    #[error("unknown game: {0}")]
    ProfileNotFound(String),
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
    #[error("player state unavailable: {0}")]
    StoreUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

use thiserror::Error;

pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("tool kind `{kind}` is not registered")]
    UnregisteredTool { kind: String },

    #[error("tool `{id}` does not exist")]
    ToolNotFound { id: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid import payload: {0}")]
    InvalidImport(String),

    #[error("invalid tool options: {0}")]
    InvalidOptions(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

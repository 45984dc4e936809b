use thiserror::Error;

pub type PixvaultResult<T> = Result<T, PixvaultError>;

#[derive(Debug, Error)]
pub enum PixvaultError {
    #[error("credential error: {0}")]
    Credential(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

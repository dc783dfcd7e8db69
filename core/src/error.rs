use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;

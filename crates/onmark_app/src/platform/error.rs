use std::io;

use onmark_engine::{ConfigError, EngineError, PersistError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("data directory unavailable: {0}")]
    Persist(#[from] PersistError),
    #[error("terminal io failed: {0}")]
    Io(#[from] io::Error),
}

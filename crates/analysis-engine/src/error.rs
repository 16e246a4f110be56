//! Engine error types

use std::time::Duration;

use match_core::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to launch engine: {0}")]
    Launch(String),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine gave no answer within {0:?}")]
    ProtocolStall(Duration),

    #[error("Engine closed its output")]
    Closed,

    #[error("Engine move rejected: {0}")]
    Session(#[from] SessionError),
}

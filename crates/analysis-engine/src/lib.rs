//! Client for an external UCI analysis engine, and the automated opponent
//! built on top of it.

pub mod config;
pub mod error;
pub mod opponent;
pub mod process;
pub mod protocol;

pub use config::EngineConfig;
pub use error::EngineError;
pub use opponent::{Analyst, BotOpponent, BotTurn, ProcessAnalyst};
pub use process::AnalysisProcess;
pub use protocol::{AnalysisRequest, AnalysisResponse};

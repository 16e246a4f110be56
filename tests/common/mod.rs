#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use analysis_engine::{AnalysisRequest, AnalysisResponse, Analyst, BotOpponent, EngineError};
use async_trait::async_trait;
use chat_bot::{BotConfig, Dispatcher, Reply};
use match_core::{MoveOracle, SessionRegistry, StandardChessOracle};

pub fn oracle() -> Arc<dyn MoveOracle> {
    Arc::new(StandardChessOracle)
}

/// Generate a unique suffix based on timestamp to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", std::process::id(), ts % 1_000_000_000)
}

/// Fresh snapshot path under the system temp dir.
pub fn temp_snapshot_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("chat-bot-it-{}", unique_suffix()))
        .join("sessions.bin")
}

/// Analyst that replays canned `(move, eval)` pairs in order, then fails.
pub struct ScriptedAnalyst {
    responses: Mutex<Vec<AnalysisResponse>>,
    pub requests: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedAnalyst {
    pub fn new(moves: &[(&str, &str)]) -> Arc<Self> {
        let responses = moves
            .iter()
            .rev()
            .map(|(mv, eval)| AnalysisResponse {
                best_move: mv.to_string(),
                evaluation: Some(eval.to_string()),
            })
            .collect();
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Analyst for ScriptedAnalyst {
    async fn best_move(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop().ok_or(EngineError::Closed)
    }
}

pub fn test_config() -> BotConfig {
    BotConfig {
        premove_settle: Duration::ZERO,
        ..BotConfig::default()
    }
}

pub fn dispatcher_with(analyst: Arc<dyn Analyst>, registry: SessionRegistry) -> Dispatcher {
    Dispatcher::new(registry, oracle(), BotOpponent::new(analyst, 10), test_config())
}

pub fn texts(replies: &[Reply]) -> Vec<String> {
    replies
        .iter()
        .filter_map(|r| match r {
            Reply::Text(t) => Some(t.clone()),
            Reply::Board(_) => None,
        })
        .collect()
}

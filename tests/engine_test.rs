/// The bot driven through the real line protocol against a fake engine
/// on an in-memory pipe.
mod common;

use std::sync::Arc;
use std::time::Duration;

use analysis_engine::{
    AnalysisProcess, AnalysisRequest, AnalysisResponse, Analyst, BotOpponent, BotTurn, EngineError,
};
use async_trait::async_trait;
use match_core::{Outcome, Session, Side};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

/// Answers `isready` and replies to `go` with one scripted search.
async fn fake_engine(stream: DuplexStream, search: Vec<String>) {
    let (read, mut write) = tokio::io::split(stream);
    let mut lines = BufReader::new(read).lines();
    while let Ok(Some(cmd)) = lines.next_line().await {
        let reply: Vec<String> = match cmd.as_str() {
            "isready" => vec!["readyok".to_string()],
            "quit" => break,
            c if c.starts_with("go ") => search.clone(),
            _ => vec![],
        };
        for line in reply {
            if write.write_all(format!("{line}\n").as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

/// Spawns a fresh fake engine per request, the way `ProcessAnalyst`
/// spawns a process.
struct PipeAnalyst {
    search: Vec<String>,
}

#[async_trait]
impl Analyst for PipeAnalyst {
    async fn best_move(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        let (ours, theirs) = duplex(4096);
        tokio::spawn(fake_engine(theirs, self.search.clone()));
        let (read, write) = tokio::io::split(ours);
        let mut engine = AnalysisProcess::from_io(write, read, Duration::from_secs(2));
        let result = async {
            engine.allocate(Some(1), Some(16)).await?;
            engine.analyze(request).await
        }
        .await;
        engine.quit().await;
        result
    }
}

fn bot_game() -> Session {
    let mut session = Session::start(common::oracle(), "chess", "alice", "bot", None).unwrap();
    session.set_bot("bot", 20).unwrap();
    session.apply_move("alice", "e2e4").unwrap();
    session
}

fn bot(search: &[&str]) -> BotOpponent {
    let analyst = PipeAnalyst {
        search: search.iter().map(|s| s.to_string()).collect(),
    };
    BotOpponent::new(Arc::new(analyst), 10)
}

#[tokio::test]
async fn test_bot_plays_engine_bestmove() {
    let bot = bot(&[
        "info depth 1 score cp -20 pv e7e5",
        "info depth 2 score cp -12 pv c7c5",
        "bestmove c7c5 ponder g1f3",
    ]);
    let mut session = bot_game();

    let turn = bot.take_turn(&mut session).await.unwrap();
    match turn {
        BotTurn::Moved {
            token,
            notation,
            evaluation,
            ..
        } => {
            assert_eq!(token, "c7c5");
            assert_eq!(notation, "c5");
            assert_eq!(evaluation.as_deref(), Some("cp -12"));
        }
        other => panic!("expected a move, got {other:?}"),
    }
    assert_eq!(session.moves_applied(), ["e2e4", "c7c5"]);
}

#[tokio::test]
async fn test_bot_resigns_on_forced_mate() {
    let bot = bot(&["info depth 5 score mate -1 pv f7f6", "bestmove f7f6"]);
    let mut session = bot_game();

    let turn = bot.take_turn(&mut session).await.unwrap();
    assert_eq!(turn, BotTurn::Resigned(Outcome::Winner(Side::White)));
    assert_eq!(session.moves_applied(), ["e2e4"]);
}

#[tokio::test]
async fn test_silent_engine_stalls() {
    // Never prints bestmove.
    let bot = bot(&["info depth 1 score cp 0"]);
    let mut session = bot_game();

    let err = bot.take_turn(&mut session).await.unwrap_err();
    assert!(matches!(err, EngineError::ProtocolStall(_)));
    assert!(session.is_bot_to_move());
}

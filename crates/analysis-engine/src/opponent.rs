//! The automated opponent: ask an analyst for a move, then let the
//! decision policy choose between moving, resigning and offering a draw.

use std::sync::Arc;

use async_trait::async_trait;
use match_core::{decide, BotAction, DecisionContext, Evaluation, Outcome, Session};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::process::AnalysisProcess;
use crate::protocol::{AnalysisRequest, AnalysisResponse};

/// Something that can answer a best-move request.
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn best_move(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError>;
}

/// Runs each request in a freshly spawned engine process.
#[derive(Clone, Debug)]
pub struct ProcessAnalyst {
    config: EngineConfig,
}

impl ProcessAnalyst {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Analyst for ProcessAnalyst {
    async fn best_move(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        let mut engine = AnalysisProcess::launch(
            &self.config,
            &request.variant,
            request.skill,
            request.chess960,
        )
        .await?;

        let result = async {
            engine
                .allocate(Some(self.config.threads), Some(self.config.hash_mb))
                .await?;
            engine.analyze(request).await
        }
        .await;

        // Released whether or not the search succeeded.
        engine.quit().await;
        result
    }
}

/// What the automated opponent did on its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotTurn {
    Moved {
        token: String,
        notation: String,
        /// Set when the move ended the game.
        outcome: Option<Outcome>,
        evaluation: Option<String>,
    },
    Resigned(Outcome),
    /// Self-play only: the bot offered and accepted its own draw.
    DrawAgreed(Outcome),
    NotBotsTurn,
}

#[derive(Clone)]
pub struct BotOpponent {
    analyst: Arc<dyn Analyst>,
    movetime_ms: u64,
}

impl BotOpponent {
    pub fn new(analyst: Arc<dyn Analyst>, movetime_ms: u64) -> Self {
        Self {
            analyst,
            movetime_ms,
        }
    }

    /// Play the automated side's turn. On engine failure, or if the
    /// session rejects the engine's move, the session is left exactly as
    /// it was. A premove queued by the opponent is not run here.
    pub async fn take_turn(&self, session: &mut Session) -> Result<BotTurn, EngineError> {
        if !session.is_bot_to_move() {
            return Ok(BotTurn::NotBotsTurn);
        }

        let request = AnalysisRequest {
            variant: session.variant().to_string(),
            chess960: session.flags().chess960,
            skill: session.bot_skill(),
            position: session.start_position().to_string(),
            moves: session.moves_applied().to_vec(),
            movetime_ms: self.movetime_ms,
        };
        let response = self.analyst.best_move(&request).await?;

        let evaluation = response.evaluation.as_deref().and_then(Evaluation::parse);
        let decision = decide(
            evaluation,
            &DecisionContext {
                self_play: session.is_self_play(),
                skill: session.bot_skill(),
                consecutive_drawish: session.consecutive_drawish(),
                ply_count: session.ply_count(),
            },
        );

        let bot = session.player_to_move().to_string();
        let turn = match decision.action {
            BotAction::Resign => {
                info!(bot = %bot, eval = ?evaluation, "Bot resigns");
                BotTurn::Resigned(session.resign(&bot)?)
            }
            BotAction::OfferDraw => {
                info!(bot = %bot, plies = session.ply_count(), "Bot agrees a self-play draw");
                session.offer_draw(&bot)?;
                BotTurn::DrawAgreed(session.agree_draw()?)
            }
            BotAction::Move => {
                let (notation, outcome) = session.apply_ply(&bot, &response.best_move)?;
                BotTurn::Moved {
                    token: response.best_move,
                    notation,
                    outcome,
                    evaluation: response.evaluation,
                }
            }
        };
        session.set_consecutive_drawish(decision.consecutive_drawish);
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_core::{MoveOracle, Side, StandardChessOracle};
    use std::sync::Mutex;

    /// Replays canned responses and records the requests it saw.
    struct ScriptedAnalyst {
        responses: Mutex<Vec<AnalysisResponse>>,
        requests: Mutex<Vec<AnalysisRequest>>,
    }

    impl ScriptedAnalyst {
        fn new(responses: Vec<(&str, Option<&str>)>) -> Arc<Self> {
            let mut responses: Vec<AnalysisResponse> = responses
                .into_iter()
                .map(|(mv, eval)| AnalysisResponse {
                    best_move: mv.to_string(),
                    evaluation: eval.map(str::to_string),
                })
                .collect();
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Analyst for ScriptedAnalyst {
        async fn best_move(
            &self,
            request: &AnalysisRequest,
        ) -> Result<AnalysisResponse, EngineError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses.lock().unwrap().pop().ok_or(EngineError::Closed)
        }
    }

    fn oracle() -> Arc<dyn MoveOracle> {
        Arc::new(StandardChessOracle)
    }

    fn bot_game() -> Session {
        let mut session = Session::start(oracle(), "chess", "alice", "bot", None).unwrap();
        session.set_bot("bot", 12).unwrap();
        session
    }

    #[tokio::test]
    async fn test_bot_moves_on_its_turn() {
        let analyst = ScriptedAnalyst::new(vec![("e7e5", Some("cp 20"))]);
        let bot = BotOpponent::new(analyst.clone(), 100);
        let mut session = bot_game();

        assert_eq!(bot.take_turn(&mut session).await.unwrap(), BotTurn::NotBotsTurn);

        session.apply_move("alice", "e2e4").unwrap();
        let turn = bot.take_turn(&mut session).await.unwrap();
        assert!(matches!(turn, BotTurn::Moved { ref notation, .. } if notation == "e5"));
        assert_eq!(session.moves_applied(), ["e2e4", "e7e5"]);

        let requests = analyst.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].moves, vec!["e2e4".to_string()]);
        assert_eq!(requests[0].skill, 12);
        assert_eq!(requests[0].movetime_ms, 100);
    }

    #[tokio::test]
    async fn test_bot_resigns_when_mated_in_one() {
        let analyst = ScriptedAnalyst::new(vec![("e7e5", Some("mate -1"))]);
        let bot = BotOpponent::new(analyst, 100);
        let mut session = bot_game();
        session.apply_move("alice", "e2e4").unwrap();

        let turn = bot.take_turn(&mut session).await.unwrap();
        assert_eq!(turn, BotTurn::Resigned(Outcome::Winner(Side::White)));
        assert!(!session.is_active());
        assert_eq!(session.ply_count(), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_session_untouched() {
        let analyst = ScriptedAnalyst::new(vec![]);
        let bot = BotOpponent::new(analyst, 100);
        let mut session = bot_game();
        session.apply_move("alice", "e2e4").unwrap();
        let before = session.snapshot();

        assert!(matches!(
            bot.take_turn(&mut session).await,
            Err(EngineError::Closed)
        ));
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_illegal_engine_move_is_an_error() {
        let analyst = ScriptedAnalyst::new(vec![("a1a8", Some("cp 0"))]);
        let bot = BotOpponent::new(analyst, 100);
        let mut session = bot_game();
        session.apply_move("alice", "e2e4").unwrap();
        session.set_consecutive_drawish(4);

        assert!(matches!(
            bot.take_turn(&mut session).await,
            Err(EngineError::Session(_))
        ));
        assert_eq!(session.ply_count(), 1);
        assert_eq!(session.consecutive_drawish(), 4);
    }

    #[tokio::test]
    async fn test_opponent_premove_left_queued() {
        let analyst = ScriptedAnalyst::new(vec![("e7e5", Some("cp 10"))]);
        let bot = BotOpponent::new(analyst, 100);
        let mut session = bot_game();
        session.apply_move("alice", "e2e4").unwrap();
        session.set_premove("alice", Some("Nf3")).unwrap();

        let turn = bot.take_turn(&mut session).await.unwrap();
        assert!(matches!(turn, BotTurn::Moved { outcome: None, .. }));
        assert_eq!(session.moves_applied(), ["e2e4", "e7e5"]);
        assert_eq!(session.premove(), Some("Nf3"));
    }
}

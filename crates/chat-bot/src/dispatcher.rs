//! Turns chat commands into session operations and reply messages.
//!
//! Each command locks its conversation's session for its whole duration,
//! including any bot search that follows it.

use std::collections::HashMap;
use std::sync::Arc;

use analysis_engine::{BotOpponent, BotTurn};
use match_core::{
    MoveOracle, Outcome, PremoveReport, RenderRequest, Session, SessionError, SessionRegistry,
    Side,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::commands::{self, Command, HELP_TEXT};
use crate::config::BotConfig;
use crate::error::BotError;

/// One outgoing chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Board(RenderRequest),
}

/// Seats and setup of a finished game, kept for `--rematch`.
#[derive(Debug, Clone)]
struct Pairing {
    variant: String,
    white: String,
    black: String,
    start_position: Option<String>,
    bot_skill: Option<i32>,
}

impl Pairing {
    fn from_session(session: &Session) -> Self {
        Self {
            variant: session.variant().to_string(),
            white: session.white_player().to_string(),
            black: session.black_player().to_string(),
            start_position: Some(session.start_position().to_string()),
            bot_skill: session.bot_identity().map(|_| session.bot_skill()),
        }
    }

    fn swapped(self) -> Self {
        Self {
            white: self.black,
            black: self.white,
            ..self
        }
    }

    fn is_participant(&self, player: &str) -> bool {
        self.white == player || self.black == player
    }
}

pub struct Dispatcher {
    registry: SessionRegistry,
    oracle: Arc<dyn MoveOracle>,
    bot: BotOpponent,
    config: BotConfig,
    finished: Mutex<HashMap<String, Pairing>>,
}

impl Dispatcher {
    pub fn new(
        registry: SessionRegistry,
        oracle: Arc<dyn MoveOracle>,
        bot: BotOpponent,
        config: BotConfig,
    ) -> Self {
        Self {
            registry,
            oracle,
            bot,
            config,
            finished: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Handle one chat message. Non-command messages produce no replies;
    /// every error becomes a text reply.
    pub async fn handle(&self, conversation: &str, user: &str, text: &str) -> Vec<Reply> {
        let mut replies = Vec::new();
        let result = match commands::parse(text) {
            Ok(None) => return replies,
            Ok(Some(command)) => {
                debug!(conversation, user, ?command, "Command");
                self.execute(conversation, user, command, &mut replies).await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            replies.push(Reply::Text(e.user_message(&self.config.allowed_variants)));
        }
        replies
    }

    async fn execute(
        &self,
        conversation: &str,
        user: &str,
        command: Command,
        replies: &mut Vec<Reply>,
    ) -> Result<(), BotError> {
        match command {
            Command::Help => {
                replies.push(Reply::Text(HELP_TEXT.to_string()));
                Ok(())
            }
            Command::Game {
                variant,
                opponent,
                start_position,
            } => {
                let pairing = Pairing {
                    variant,
                    white: user.to_string(),
                    black: opponent,
                    start_position,
                    bot_skill: None,
                };
                self.start_game(conversation, pairing, replies).await
            }
            Command::SelfPlay { variant } => {
                let bot = self.config.bot_name.clone();
                let pairing = Pairing {
                    variant,
                    white: bot.clone(),
                    black: bot,
                    start_position: None,
                    bot_skill: None,
                };
                self.start_game(conversation, pairing, replies).await
            }
            Command::Rematch => {
                let previous = self
                    .finished
                    .lock()
                    .await
                    .get(conversation)
                    .cloned()
                    .ok_or(BotError::NoRematch)?;
                if !previous.is_participant(user) {
                    return Err(SessionError::NotAParticipant(user.to_string()).into());
                }
                self.start_game(conversation, previous.swapped(), replies).await
            }
            command => {
                let handle = self
                    .registry
                    .get(conversation)
                    .await
                    .ok_or(SessionError::NoSession)?;
                let mut session = handle.lock().await;
                if !session.is_active() {
                    return Err(SessionError::SessionInactive.into());
                }
                let result = self.play(user, command, &mut session, replies).await;
                let settled = self.settle(conversation, &mut session, replies).await;
                result.and(settled)
            }
        }
    }

    async fn start_game(
        &self,
        conversation: &str,
        pairing: Pairing,
        replies: &mut Vec<Reply>,
    ) -> Result<(), BotError> {
        if !self.config.allows(&pairing.variant) {
            return Err(BotError::VariantNotAllowed(pairing.variant));
        }
        let mut session = Session::start(
            self.oracle.clone(),
            &pairing.variant,
            &pairing.white,
            &pairing.black,
            pairing.start_position.as_deref(),
        )?;
        if session.is_participant(&self.config.bot_name) {
            let skill = pairing.bot_skill.unwrap_or(self.config.default_skill);
            session.set_bot(&self.config.bot_name, skill)?;
        }

        let handle = self.registry.insert(conversation, session).await?;
        // A new game here replaces any pairing kept for a rematch.
        self.finished.lock().await.remove(conversation);
        let mut session = handle.lock().await;
        info!(conversation, variant = %pairing.variant, "Game started");
        replies.push(Reply::Text(format!(
            "Game started of: **{}**\n**{}** (White) vs **{}** (Black)",
            pairing.variant, pairing.white, pairing.black
        )));
        replies.push(Reply::Board(session.render_request()));
        self.settle(conversation, &mut session, replies).await
    }

    async fn play(
        &self,
        user: &str,
        command: Command,
        session: &mut Session,
        replies: &mut Vec<Reply>,
    ) -> Result<(), BotError> {
        match command {
            Command::Move(text) => {
                if session.seat(user)? != session.turn() {
                    return Err(SessionError::NotYourTurn.into());
                }
                let token = session
                    .resolve_input(&text)
                    .ok_or_else(|| SessionError::AmbiguousOrInvalidMove(text.clone()))?;
                let (notation, _) = session.apply_ply(user, &token)?;
                replies.push(Reply::Text(format!("Made move: **{notation}**")));
                self.premove_step(session, replies).await;
                replies.push(Reply::Board(session.render_request()));
            }
            Command::Premove(text) => {
                session.set_premove(user, text.as_deref())?;
                let msg = match session.premove() {
                    Some(p) => format!("Premove set: **{p}**"),
                    None => "Premove cleared.".to_string(),
                };
                replies.push(Reply::Text(msg));
            }
            Command::Display => {
                replies.push(Reply::Text(describe(session)));
                replies.push(Reply::Board(session.render_request()));
            }
            Command::Moves => {
                let history = session.notation_history();
                let msg = if history.is_empty() {
                    "No moves have been played yet.".to_string()
                } else {
                    format!("**Moves:** {}", format_history(session, &history))
                };
                replies.push(Reply::Text(msg));
            }
            Command::Resign => {
                session.resign(user)?;
                replies.push(Reply::Text(format!("**{user}** resigns.")));
            }
            Command::OfferDraw => {
                let side = session.offer_draw(user)?;
                replies.push(Reply::Text(format!(
                    "**{user}** ({side}) offers a draw. Use --acceptdraw to accept."
                )));
            }
            Command::AcceptDraw => {
                session.accept_draw(user)?;
                replies.push(Reply::Text(format!("**{user}** accepts the draw.")));
            }
            Command::Takeback => {
                session.request_takeback(user)?;
                replies.push(Reply::Text(format!("**{user}** requests a takeback.")));
                let opponent = session.opponent_of(user).map(str::to_string);
                if let Some(bot) = opponent.filter(|o| session.is_bot(o)) {
                    let undone = session.accept_takeback(&bot)?;
                    replies.push(Reply::Text(format!(
                        "**{bot}** accepts the takeback ({undone} plies undone)."
                    )));
                    replies.push(Reply::Board(session.render_request()));
                }
            }
            Command::AcceptTakeback => {
                let undone = session.accept_takeback(user)?;
                replies.push(Reply::Text(format!(
                    "Takeback accepted ({undone} plies undone)."
                )));
                replies.push(Reply::Board(session.render_request()));
            }
            Command::Skill(level) => {
                session.seat(user)?;
                if session.bot_identity().is_none() {
                    return Err(BotError::NoBot);
                }
                session.set_bot_skill(level);
                replies.push(Reply::Text(format!(
                    "Bot skill set to **{}**.",
                    session.bot_skill()
                )));
            }
            Command::BotMove => {
                if !session.is_bot_to_move() {
                    replies.push(Reply::Text("It's not the bot's turn.".to_string()));
                }
            }
            // Handled before a session is locked.
            Command::Help | Command::Game { .. } | Command::SelfPlay { .. } | Command::Rematch => {}
        }
        Ok(())
    }

    /// Let the bot play while it is to move, then close the game if it
    /// has ended.
    async fn settle(
        &self,
        conversation: &str,
        session: &mut Session,
        replies: &mut Vec<Reply>,
    ) -> Result<(), BotError> {
        let result = self.bot_turns(session, replies).await;
        if !session.is_active() {
            self.game_over(conversation, session, replies).await;
        }
        result
    }

    async fn bot_turns(
        &self,
        session: &mut Session,
        replies: &mut Vec<Reply>,
    ) -> Result<(), BotError> {
        let bot = self.config.bot_name.as_str();
        // Self-play only shows the final board.
        let each_board = !session.is_self_play();
        let mut plies = 0;

        while session.is_bot_to_move() && plies < self.config.self_play_max_plies {
            match self.bot.take_turn(session).await? {
                BotTurn::Moved {
                    notation,
                    evaluation,
                    ..
                } => {
                    let eval = evaluation.map(|e| format!(" ({e})")).unwrap_or_default();
                    replies.push(Reply::Text(format!("**{bot}** plays **{notation}**{eval}")));
                    self.premove_step(session, replies).await;
                    if each_board {
                        replies.push(Reply::Board(session.render_request()));
                    }
                }
                BotTurn::Resigned(_) => {
                    replies.push(Reply::Text(format!("**{bot}** resigns.")));
                }
                BotTurn::DrawAgreed(_) => {
                    replies.push(Reply::Text(format!("**{bot}** agrees a draw with itself.")));
                }
                BotTurn::NotBotsTurn => break,
            }
            plies += 1;
        }

        if !each_board && plies > 0 {
            replies.push(Reply::Board(session.render_request()));
        }
        Ok(())
    }

    /// Run the queued premove of the side now to move, after the settle
    /// delay. Does nothing once the game has ended.
    async fn premove_step(&self, session: &mut Session, replies: &mut Vec<Reply>) {
        if !session.is_active() || session.premove().is_none() {
            return;
        }
        tokio::time::sleep(self.config.premove_settle).await;
        if let Some((report, _)) = session.run_premove() {
            replies.push(Reply::Text(premove_text(&report)));
        }
    }

    async fn game_over(&self, conversation: &str, session: &Session, replies: &mut Vec<Reply>) {
        let Some(outcome) = session.outcome() else {
            return;
        };
        let headline = match outcome {
            Outcome::Winner(side) => format!("**{}** ({side}) wins!", session.player(side)),
            Outcome::Draw => "The game is drawn.".to_string(),
        };
        let history = session.notation_history();
        let record = if history.is_empty() {
            outcome.result_str().to_string()
        } else {
            format!("{} {}", format_history(session, &history), outcome.result_str())
        };
        replies.push(Reply::Text(format!("**GAME OVER**\n{headline}\n{record}")));

        self.finished
            .lock()
            .await
            .insert(conversation.to_string(), Pairing::from_session(session));
        self.registry.remove(conversation).await;
        info!(conversation, result = outcome.result_str(), "Game over");
    }
}

fn premove_text(report: &PremoveReport) -> String {
    match report {
        PremoveReport::Played { notation, .. } => format!("Premove played: **{notation}**"),
        PremoveReport::Unresolved(text) => {
            format!("Premove `{text}` was not a legal move and has been cleared.")
        }
    }
}

fn describe(session: &Session) -> String {
    let turn = session.turn();
    let mut lines = vec![
        format!("**Variant:** {}", session.variant()),
        format!("**Position:** {}", session.current_position()),
        format!(
            "**White:** {}  **Black:** {}",
            session.white_player(),
            session.black_player()
        ),
        format!("**To move:** {} ({turn})", session.player(turn)),
        format!("**Plies played:** {}", session.ply_count()),
        format!("**Legal moves:** {}", session.legal_notations().join(", ")),
    ];
    if let Some(bot) = session.bot_identity() {
        lines.push(format!("**Bot:** {bot} (skill {})", session.bot_skill()));
    }
    for side in [Side::White, Side::Black] {
        if session.draw_offered(side) {
            lines.push(format!("{side} has offered a draw."));
        }
        if session.takeback_requested(side) {
            lines.push(format!("{side} has requested a takeback."));
        }
    }
    lines.push(format!("**Game age:** {:.1} minutes", session.age_minutes()));
    lines.join("\n")
}

/// Number moves from the session's start position: `1. e4 e5 2. Nf3`,
/// or `1... e5 2. Nf3` when black moved first.
fn format_history(session: &Session, history: &[String]) -> String {
    let start = session.start_position();
    let mut side = session.oracle().side_to_move(session.variant(), start);
    let mut number: u32 = start
        .split_whitespace()
        .nth(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);

    let mut parts = Vec::with_capacity(history.len() + history.len() / 2 + 1);
    for (i, san) in history.iter().enumerate() {
        match side {
            Side::White => parts.push(format!("{number}.")),
            Side::Black if i == 0 => parts.push(format!("{number}...")),
            Side::Black => {}
        }
        parts.push(san.clone());
        if side == Side::Black {
            number += 1;
        }
        side = side.opposite();
    }
    parts.join(" ")
}

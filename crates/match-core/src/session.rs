//! Session state machine for a single match.
//!
//! Every rule question goes to the [`MoveOracle`] the session was created
//! with. The session owns turn tracking, draw and takeback negotiation,
//! premoves, and the end-of-game transition.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::notation::closest_notation;
use crate::oracle::{MoveOracle, TerminalValue, VariantFlags};
use crate::render::RenderRequest;
use crate::side::{Outcome, Side};
use crate::variant::variant_info;

pub const MIN_BOT_SKILL: i32 = -20;
pub const MAX_BOT_SKILL: i32 = 20;

/// What happened to a queued premove after the opponent moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PremoveReport {
    Played { token: String, notation: String },
    /// The queued text matched no single legal move and was dropped.
    Unresolved(String),
}

/// Result of a successful `apply_move`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub token: String,
    pub notation: String,
    pub premove: Option<PremoveReport>,
    /// Set when the move (or the premove after it) ended the game.
    pub outcome: Option<Outcome>,
}

#[derive(Clone)]
pub struct Session {
    pub(crate) oracle: Arc<dyn MoveOracle>,
    pub(crate) variant: String,
    pub(crate) flags: VariantFlags,
    pub(crate) white_player: String,
    pub(crate) black_player: String,
    pub(crate) bot_identity: Option<String>,
    pub(crate) start_position: String,
    pub(crate) moves_applied: Vec<String>,
    pub(crate) current_position: String,
    pub(crate) draw_offered: [bool; 2],
    pub(crate) takeback_requested: [bool; 2],
    pub(crate) premove: Option<String>,
    pub(crate) bot_skill: i32,
    pub(crate) consecutive_drawish: u32,
    pub(crate) active: bool,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) started_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("variant", &self.variant)
            .field("white_player", &self.white_player)
            .field("black_player", &self.black_player)
            .field("current_position", &self.current_position)
            .field("moves_applied", &self.moves_applied)
            .field("active", &self.active)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a new match. `start_position` overrides the variant's default.
    pub fn start(
        oracle: Arc<dyn MoveOracle>,
        variant: &str,
        white_player: &str,
        black_player: &str,
        start_position: Option<&str>,
    ) -> Result<Session, SessionError> {
        if !oracle.supports(variant) {
            return Err(SessionError::UnknownVariant(variant.to_string()));
        }
        let start_position = match start_position {
            Some(pos) => {
                oracle.validate_position(variant, pos)?;
                pos.to_string()
            }
            None => oracle.starting_position(variant)?,
        };
        let flags = variant_info(variant).flags;

        let session = Session {
            oracle,
            variant: variant.to_string(),
            flags,
            white_player: white_player.to_string(),
            black_player: black_player.to_string(),
            bot_identity: None,
            current_position: start_position.clone(),
            start_position,
            moves_applied: Vec::new(),
            draw_offered: [false; 2],
            takeback_requested: [false; 2],
            premove: None,
            bot_skill: 0,
            consecutive_drawish: 0,
            active: true,
            outcome: None,
            started_at: Utc::now(),
        };
        // A start position with nothing left to play can never progress.
        if session.check_ended().is_some() {
            return Err(SessionError::InvalidPosition(format!(
                "{}: game is already over",
                session.start_position
            )));
        }

        info!(variant, white = white_player, black = black_player, "Session started");
        Ok(session)
    }

    /// Seat the automated opponent. `identity` must be one of the players.
    pub fn set_bot(&mut self, identity: &str, skill: i32) -> Result<(), SessionError> {
        if !self.is_participant(identity) {
            return Err(SessionError::NotAParticipant(identity.to_string()));
        }
        self.bot_identity = Some(identity.to_string());
        self.set_bot_skill(skill);
        Ok(())
    }

    pub fn set_bot_skill(&mut self, skill: i32) {
        self.bot_skill = skill.clamp(MIN_BOT_SKILL, MAX_BOT_SKILL);
    }

    // ---- accessors ----

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn flags(&self) -> VariantFlags {
        self.flags
    }

    pub fn white_player(&self) -> &str {
        &self.white_player
    }

    pub fn black_player(&self) -> &str {
        &self.black_player
    }

    pub fn bot_identity(&self) -> Option<&str> {
        self.bot_identity.as_deref()
    }

    pub fn start_position(&self) -> &str {
        &self.start_position
    }

    pub fn current_position(&self) -> &str {
        &self.current_position
    }

    pub fn moves_applied(&self) -> &[String] {
        &self.moves_applied
    }

    pub fn ply_count(&self) -> usize {
        self.moves_applied.len()
    }

    pub fn premove(&self) -> Option<&str> {
        self.premove.as_deref()
    }

    pub fn bot_skill(&self) -> i32 {
        self.bot_skill
    }

    pub fn consecutive_drawish(&self) -> u32 {
        self.consecutive_drawish
    }

    pub fn set_consecutive_drawish(&mut self, count: u32) {
        self.consecutive_drawish = count;
    }

    pub fn draw_offered(&self, side: Side) -> bool {
        self.draw_offered[side.index()]
    }

    pub fn takeback_requested(&self, side: Side) -> bool {
        self.takeback_requested[side.index()]
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn age_minutes(&self) -> f64 {
        let secs = (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0;
        (secs / 60.0 * 100.0).round() / 100.0
    }

    pub fn oracle(&self) -> &Arc<dyn MoveOracle> {
        &self.oracle
    }

    // ---- seats and turns ----

    pub fn turn(&self) -> Side {
        self.oracle.side_to_move(&self.variant, &self.current_position)
    }

    pub fn player(&self, side: Side) -> &str {
        match side {
            Side::White => &self.white_player,
            Side::Black => &self.black_player,
        }
    }

    pub fn player_to_move(&self) -> &str {
        self.player(self.turn())
    }

    pub fn is_self_play(&self) -> bool {
        self.white_player == self.black_player
    }

    pub fn is_participant(&self, player: &str) -> bool {
        self.white_player == player || self.black_player == player
    }

    pub fn is_bot(&self, player: &str) -> bool {
        self.bot_identity.as_deref() == Some(player)
    }

    pub fn is_bot_to_move(&self) -> bool {
        self.active && self.is_bot(self.player_to_move())
    }

    /// The other player's identity, or `None` for non-participants.
    pub fn opponent_of(&self, player: &str) -> Option<&str> {
        if self.white_player == player {
            Some(&self.black_player)
        } else if self.black_player == player {
            Some(&self.white_player)
        } else {
            None
        }
    }

    /// Which side `player` acts for. In self-play that is the side to move.
    pub fn seat(&self, player: &str) -> Result<Side, SessionError> {
        match (self.white_player == player, self.black_player == player) {
            (true, true) => Ok(self.turn()),
            (true, false) => Ok(Side::White),
            (false, true) => Ok(Side::Black),
            (false, false) => Err(SessionError::NotAParticipant(player.to_string())),
        }
    }

    pub fn is_players_turn(&self, player: &str) -> bool {
        self.seat(player).map(|s| s == self.turn()).unwrap_or(false)
    }

    fn require_active(&self) -> Result<(), SessionError> {
        if self.active {
            Ok(())
        } else {
            Err(SessionError::SessionInactive)
        }
    }

    // ---- moves ----

    /// Legal moves as (token, notation) pairs in oracle order.
    pub fn legal_moves(&self) -> Vec<(String, String)> {
        let oracle = &self.oracle;
        oracle
            .legal_moves(&self.variant, &self.current_position, &[], &self.flags)
            .into_iter()
            .filter_map(|token| {
                let san =
                    oracle.notation(&self.variant, &self.current_position, &token, &self.flags)?;
                Some((token, san))
            })
            .collect()
    }

    pub fn legal_notations(&self) -> Vec<String> {
        self.legal_moves().into_iter().map(|(_, san)| san).collect()
    }

    /// Map chat input to a legal move token, or `None` if it matches zero
    /// or several moves.
    pub fn resolve_input(&self, text: &str) -> Option<String> {
        let legal = self.legal_moves();
        let notations: Vec<&str> = legal.iter().map(|(_, san)| san.as_str()).collect();
        if let Some(idx) = closest_notation(&notations, text) {
            return Some(legal[idx].0.clone());
        }
        let text = text.trim();
        legal
            .into_iter()
            .find(|(token, _)| token == text)
            .map(|(token, _)| token)
    }

    pub fn notation_history(&self) -> Vec<String> {
        self.oracle.notation_history(
            &self.variant,
            &self.start_position,
            &self.moves_applied,
            &self.flags,
        )
    }

    fn recompute_position(&mut self) -> Result<(), SessionError> {
        self.current_position = self.oracle.apply_moves(
            &self.variant,
            &self.start_position,
            &self.moves_applied,
            &self.flags,
        )?;
        Ok(())
    }

    fn cancel_offers(&mut self) {
        self.draw_offered = [false; 2];
        self.takeback_requested = [false; 2];
    }

    /// Append a legal token for the side to move, without any turn check.
    fn push_ply(&mut self, token: &str) -> Result<(String, Option<Outcome>), SessionError> {
        let illegal = || SessionError::AmbiguousOrInvalidMove(token.to_string());
        let legal = self
            .oracle
            .legal_moves(&self.variant, &self.current_position, &[], &self.flags);
        if !legal.iter().any(|t| t == token) {
            return Err(illegal());
        }
        let notation = self
            .oracle
            .notation(&self.variant, &self.current_position, token, &self.flags)
            .ok_or_else(illegal)?;

        self.moves_applied.push(token.to_string());
        if let Err(e) = self.recompute_position() {
            self.moves_applied.pop();
            return Err(e);
        }
        self.cancel_offers();
        debug!(token, notation = %notation, ply = self.moves_applied.len(), "Move applied");

        let outcome = self.check_ended();
        if let Some(outcome) = outcome {
            self.finish(outcome);
        }
        Ok((notation, outcome))
    }

    /// Apply one ply for `player` without running any queued premove.
    pub fn apply_ply(
        &mut self,
        player: &str,
        token: &str,
    ) -> Result<(String, Option<Outcome>), SessionError> {
        self.require_active()?;
        let side = self.seat(player)?;
        if side != self.turn() {
            return Err(SessionError::NotYourTurn);
        }
        self.push_ply(token)
    }

    /// Attempt the queued premove once, for the side now to move. The
    /// premove is cleared whatever happens.
    pub fn run_premove(&mut self) -> Option<(PremoveReport, Option<Outcome>)> {
        let text = self.premove.take()?;
        if !self.active {
            return None;
        }
        let Some(token) = self.resolve_input(&text) else {
            debug!(premove = %text, "Premove did not resolve");
            return Some((PremoveReport::Unresolved(text), None));
        };
        match self.push_ply(&token) {
            Ok((notation, outcome)) => Some((PremoveReport::Played { token, notation }, outcome)),
            Err(_) => Some((PremoveReport::Unresolved(text), None)),
        }
    }

    /// Apply `token` for `player`, then at most one queued premove.
    pub fn apply_move(&mut self, player: &str, token: &str) -> Result<MoveReport, SessionError> {
        let (notation, mut outcome) = self.apply_ply(player, token)?;
        let mut premove = None;
        if outcome.is_none() {
            if let Some((report, premove_outcome)) = self.run_premove() {
                premove = Some(report);
                outcome = premove_outcome;
            }
        }
        Ok(MoveReport {
            token: token.to_string(),
            notation,
            premove,
            outcome,
        })
    }

    /// Queue (or clear with `None`) a move to play as soon as the opponent
    /// has moved.
    pub fn set_premove(&mut self, player: &str, text: Option<&str>) -> Result<(), SessionError> {
        self.require_active()?;
        let side = self.seat(player)?;
        if side == self.turn() {
            return Err(SessionError::PremoveOnOwnTurn);
        }
        self.premove = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Ok(())
    }

    // ---- negotiation ----

    pub fn request_takeback(&mut self, player: &str) -> Result<Side, SessionError> {
        self.require_active()?;
        let side = self.seat(player)?;
        if self.moves_applied.is_empty() {
            return Err(SessionError::NothingToTakeBack);
        }
        if self.takeback_requested[side.index()] {
            return Err(SessionError::DuplicateOffer);
        }
        self.takeback_requested[side.index()] = true;
        Ok(side)
    }

    /// Accept the opponent's takeback request. Returns the number of plies
    /// undone: two when the requester is to move (their own last move and
    /// the reply), one when they just moved.
    pub fn accept_takeback(&mut self, player: &str) -> Result<usize, SessionError> {
        self.require_active()?;
        let requester = self.seat(player)?.opposite();
        if !self.takeback_requested[requester.index()] {
            return Err(SessionError::NoOffer);
        }
        let wanted = if self.turn() == requester { 2 } else { 1 };
        let undo = wanted.min(self.moves_applied.len());
        let keep = self.moves_applied.len() - undo;
        self.moves_applied.truncate(keep);
        self.recompute_position()?;
        self.cancel_offers();
        self.premove = None;
        info!(undo, ply = keep, "Takeback accepted");
        Ok(undo)
    }

    pub fn offer_draw(&mut self, player: &str) -> Result<Side, SessionError> {
        self.require_active()?;
        let side = self.seat(player)?;
        if self.draw_offered[side.index()] {
            return Err(SessionError::DuplicateOffer);
        }
        self.draw_offered[side.index()] = true;
        Ok(side)
    }

    pub fn accept_draw(&mut self, player: &str) -> Result<Outcome, SessionError> {
        self.require_active()?;
        let side = self.seat(player)?;
        if !self.draw_offered[side.opposite().index()] {
            return Err(SessionError::NoOffer);
        }
        self.finish(Outcome::Draw);
        Ok(Outcome::Draw)
    }

    /// Resign for `player`. The automated opponent always resigns for the
    /// side to move.
    pub fn resign(&mut self, player: &str) -> Result<Outcome, SessionError> {
        self.require_active()?;
        let loser = if self.is_bot(player) {
            self.turn()
        } else {
            self.seat(player)?
        };
        let outcome = Outcome::Winner(loser.opposite());
        self.finish(outcome);
        Ok(outcome)
    }

    /// End the match by agreement of the automated opponent with itself.
    pub fn agree_draw(&mut self) -> Result<Outcome, SessionError> {
        self.require_active()?;
        self.finish(Outcome::Draw);
        Ok(Outcome::Draw)
    }

    // ---- game end ----

    /// Ask the oracle whether the current position is terminal.
    pub fn check_ended(&self) -> Option<Outcome> {
        let oracle = &self.oracle;
        let (variant, start, moves, flags) = (
            self.variant.as_str(),
            self.start_position.as_str(),
            self.moves_applied.as_slice(),
            &self.flags,
        );

        let no_moves = oracle
            .legal_moves(variant, &self.current_position, &[], flags)
            .is_empty();
        let optional = oracle.optional_game_end(variant, start, moves, flags);
        let immediate = oracle.immediate_game_end(variant, start, moves, flags);
        let insufficient = oracle.insufficient_material(variant, start, moves, flags) == [true, true];

        if !(no_moves || optional || immediate || insufficient) {
            return None;
        }

        let turn = self.turn();
        match oracle.terminal_value(variant, start, moves, flags) {
            TerminalValue::Mate => Some(Outcome::Winner(turn)),
            TerminalValue::NegMate => Some(Outcome::Winner(turn.opposite())),
            TerminalValue::Draw => Some(Outcome::Draw),
            TerminalValue::None => None,
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.active = false;
        self.outcome = Some(outcome);
        self.premove = None;
        info!(
            variant = %self.variant,
            result = outcome.result_str(),
            plies = self.moves_applied.len(),
            "Session ended"
        );
    }

    pub fn render_request(&self) -> RenderRequest {
        let info = variant_info(&self.variant);
        let upside_down = self.turn() == Side::Black;
        RenderRequest {
            variant: self.variant.clone(),
            position: self.current_position.clone(),
            last_move: self.moves_applied.last().cloned(),
            upside_down,
            flip_pieces: info.flip_pieces && upside_down,
            info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_oracle::StandardChessOracle;

    fn oracle() -> Arc<dyn MoveOracle> {
        Arc::new(StandardChessOracle)
    }

    fn new_game() -> Session {
        Session::start(oracle(), "chess", "alice", "bob", None).unwrap()
    }

    fn play(session: &mut Session, player: &str, text: &str) -> MoveReport {
        let token = session.resolve_input(text).expect("move should resolve");
        session.apply_move(player, &token).unwrap()
    }

    #[test]
    fn test_start_unknown_variant() {
        let err = Session::start(oracle(), "shogi", "a", "b", None).unwrap_err();
        assert_eq!(err, SessionError::UnknownVariant("shogi".into()));
    }

    #[test]
    fn test_start_invalid_position() {
        let err = Session::start(oracle(), "chess", "a", "b", Some("not a fen")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPosition(_)));
    }

    #[test]
    fn test_start_rejects_finished_position() {
        // Black to move, stalemated.
        let fen = "k7/8/1Q6/8/8/8/8/4K3 b - - 0 1";
        let err = Session::start(oracle(), "chess", "a", "b", Some(fen)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPosition(_)));
    }

    #[test]
    fn test_custom_start_position_sets_turn() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 b - - 0 1";
        let session = Session::start(oracle(), "chess", "a", "b", Some(fen)).unwrap();
        assert_eq!(session.turn(), Side::Black);
        assert_eq!(session.current_position(), fen);
    }

    #[test]
    fn test_position_tracks_oracle_replay() {
        let mut session = new_game();
        for (player, text) in [("alice", "e4"), ("bob", "e5"), ("alice", "Nf3"), ("bob", "Nc6")] {
            play(&mut session, player, text);
            let replayed = session
                .oracle()
                .apply_moves("chess", session.start_position(), session.moves_applied(), &session.flags())
                .unwrap();
            assert_eq!(session.current_position(), replayed);
        }
        assert_eq!(session.notation_history(), vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_not_your_turn() {
        let mut session = new_game();
        let err = session.apply_move("bob", "e7e5").unwrap_err();
        assert_eq!(err, SessionError::NotYourTurn);
        let err = session.apply_move("carol", "e2e4").unwrap_err();
        assert_eq!(err, SessionError::NotAParticipant("carol".into()));
    }

    #[test]
    fn test_illegal_token_rejected_without_state_change() {
        let mut session = new_game();
        let err = session.apply_move("alice", "e2e5").unwrap_err();
        assert!(matches!(err, SessionError::AmbiguousOrInvalidMove(_)));
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn test_resolve_input_accepts_raw_token() {
        let session = new_game();
        assert_eq!(session.resolve_input("g1f3").as_deref(), Some("g1f3"));
        assert_eq!(session.resolve_input("nf3").as_deref(), Some("g1f3"));
        assert_eq!(session.resolve_input("N"), None);
    }

    #[test]
    fn test_move_clears_offers() {
        let mut session = new_game();
        play(&mut session, "alice", "e4");
        session.offer_draw("bob").unwrap();
        session.request_takeback("alice").unwrap();
        play(&mut session, "bob", "e5");
        assert!(!session.draw_offered(Side::Black));
        assert!(!session.takeback_requested(Side::White));
    }

    #[test]
    fn test_takeback_needs_a_move_and_one_request() {
        let mut session = new_game();
        assert_eq!(
            session.request_takeback("alice"),
            Err(SessionError::NothingToTakeBack)
        );
        assert!(!session.takeback_requested(Side::White));

        play(&mut session, "alice", "e4");
        assert_eq!(session.request_takeback("alice"), Ok(Side::White));
        assert_eq!(
            session.request_takeback("alice"),
            Err(SessionError::DuplicateOffer)
        );
        assert_eq!(session.accept_takeback("bob"), Ok(1));
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn test_duplicate_draw_offer_rejected() {
        let mut session = new_game();
        assert_eq!(session.offer_draw("alice"), Ok(Side::White));
        assert_eq!(session.offer_draw("alice"), Err(SessionError::DuplicateOffer));
        assert!(session.draw_offered(Side::White));
        assert!(!session.draw_offered(Side::Black));
    }

    #[test]
    fn test_accept_own_draw_offer_fails() {
        let mut session = new_game();
        session.offer_draw("alice").unwrap();
        assert_eq!(session.accept_draw("alice"), Err(SessionError::NoOffer));
        assert!(session.is_active());
        assert_eq!(session.accept_draw("bob"), Ok(Outcome::Draw));
        assert!(!session.is_active());
        assert_eq!(session.offer_draw("alice"), Err(SessionError::SessionInactive));
    }

    #[test]
    fn test_takeback_requester_to_move_undoes_two() {
        let mut session = new_game();
        play(&mut session, "alice", "e4");
        play(&mut session, "bob", "e5");
        session.request_takeback("alice").unwrap();
        assert_eq!(session.accept_takeback("alice"), Err(SessionError::NoOffer));
        assert_eq!(session.accept_takeback("bob"), Ok(2));
        assert_eq!(session.ply_count(), 0);
        assert_eq!(session.turn(), Side::White);
        assert!(!session.takeback_requested(Side::White));
    }

    #[test]
    fn test_takeback_requester_just_moved_undoes_one() {
        let mut session = new_game();
        play(&mut session, "alice", "e4");
        play(&mut session, "bob", "e5");
        play(&mut session, "alice", "Nf3");
        session.request_takeback("alice").unwrap();
        assert_eq!(session.accept_takeback("bob"), Ok(1));
        assert_eq!(session.moves_applied(), ["e2e4", "e7e5"]);
        assert_eq!(session.turn(), Side::White);
    }

    #[test]
    fn test_premove_runs_after_opponent_moves() {
        let mut session = new_game();
        session.set_premove("bob", Some("e5")).unwrap();
        let report = play(&mut session, "alice", "e4");
        assert_eq!(
            report.premove,
            Some(PremoveReport::Played {
                token: "e7e5".into(),
                notation: "e5".into()
            })
        );
        assert_eq!(session.premove(), None);
        assert_eq!(session.ply_count(), 2);

        // Next white move must not replay anything.
        let report = play(&mut session, "alice", "Nf3");
        assert_eq!(report.premove, None);
        assert_eq!(session.ply_count(), 3);
    }

    #[test]
    fn test_unresolved_premove_is_cleared() {
        let mut session = new_game();
        session.set_premove("bob", Some("Qxh2")).unwrap();
        let report = play(&mut session, "alice", "e4");
        assert_eq!(report.premove, Some(PremoveReport::Unresolved("Qxh2".into())));
        assert_eq!(session.premove(), None);
        assert_eq!(session.ply_count(), 1);
    }

    #[test]
    fn test_premove_on_own_turn_rejected() {
        let mut session = new_game();
        assert_eq!(
            session.set_premove("alice", Some("e4")),
            Err(SessionError::PremoveOnOwnTurn)
        );
    }

    #[test]
    fn test_premove_that_mates_ends_game() {
        let mut session = new_game();
        play(&mut session, "alice", "f3");
        play(&mut session, "bob", "e5");
        session.set_premove("bob", Some("Qh4")).unwrap();
        let report = play(&mut session, "alice", "g4");
        assert_eq!(report.outcome, Some(Outcome::Winner(Side::Black)));
        assert!(!session.is_active());
    }

    #[test]
    fn test_resign_human_and_bot() {
        let mut session = new_game();
        assert_eq!(session.resign("bob"), Ok(Outcome::Winner(Side::White)));

        let mut session = new_game();
        session.set_bot("bob", 5).unwrap();
        play(&mut session, "alice", "e4");
        // Bot to move: the side to move loses.
        assert_eq!(session.resign("bob"), Ok(Outcome::Winner(Side::White)));
    }

    #[test]
    fn test_bot_skill_clamped() {
        let mut session = new_game();
        session.set_bot("bob", 99).unwrap();
        assert_eq!(session.bot_skill(), MAX_BOT_SKILL);
        session.set_bot_skill(-50);
        assert_eq!(session.bot_skill(), MIN_BOT_SKILL);
        assert_eq!(
            session.set_bot("carol", 0),
            Err(SessionError::NotAParticipant("carol".into()))
        );
    }

    #[test]
    fn test_self_play_seat_follows_turn() {
        let mut session = Session::start(oracle(), "chess", "bot", "bot", None).unwrap();
        assert!(session.is_self_play());
        play(&mut session, "bot", "e4");
        play(&mut session, "bot", "e5");
        assert_eq!(session.seat("bot"), Ok(Side::White));
    }

    #[test]
    fn test_render_request_flips_for_black() {
        let mut session = new_game();
        play(&mut session, "alice", "e4");
        let req = session.render_request();
        assert!(req.upside_down);
        assert_eq!(req.last_move.as_deref(), Some("e2e4"));
    }
}

//! Rules oracle interface.
//!
//! Legal moves, notation, position strings and terminal detection are all
//! answered by a [`MoveOracle`]. The session never interprets a position
//! string beyond asking whose turn it is.

use crate::error::SessionError;
use crate::side::Side;

/// Per-variant switches forwarded to every oracle query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantFlags {
    pub chess960: bool,
}

/// Signed game value, from the perspective of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalValue {
    /// Side to move has won.
    Mate,
    /// Side to move has lost.
    NegMate,
    Draw,
    None,
}

pub trait MoveOracle: Send + Sync {
    /// Whether this oracle knows the rules of `variant`.
    fn supports(&self, variant: &str) -> bool;

    fn starting_position(&self, variant: &str) -> Result<String, SessionError>;

    /// Check that `position` is a well-formed, playable position string.
    fn validate_position(&self, variant: &str, position: &str) -> Result<(), SessionError>;

    /// Legal move tokens after playing `moves` from `position`.
    fn legal_moves(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> Vec<String>;

    /// Human notation of a single token played from `position`.
    fn notation(
        &self,
        variant: &str,
        position: &str,
        token: &str,
        flags: &VariantFlags,
    ) -> Option<String>;

    fn apply_moves(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> Result<String, SessionError>;

    fn notation_history(
        &self,
        variant: &str,
        start_position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> Vec<String>;

    fn terminal_value(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> TerminalValue;

    /// Claimable endings (fifty-move rule, repetition, ...).
    fn optional_game_end(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> bool;

    /// Variant-specific endings that apply immediately.
    fn immediate_game_end(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> bool;

    /// Insufficient material per side, white first.
    fn insufficient_material(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> [bool; 2];

    /// Side to move in a position string. Defaults to reading the FEN
    /// active-colour field.
    fn side_to_move(&self, _variant: &str, position: &str) -> Side {
        match position.split_whitespace().nth(1) {
            Some("b") => Side::Black,
            _ => Side::White,
        }
    }
}

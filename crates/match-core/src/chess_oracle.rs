//! `MoveOracle` for standard chess backed by shakmaty.
//!
//! Tokens are UCI moves, notation is SAN with check suffixes, positions are
//! FEN strings.

use std::collections::HashMap;

use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Position,
};

use crate::error::SessionError;
use crate::oracle::{MoveOracle, TerminalValue, VariantFlags};

pub const STANDARD_VARIANT: &str = "chess";

const FIFTY_MOVE_HALFMOVES: u32 = 100;
const REPETITION_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChessOracle;

fn castling_mode(flags: &VariantFlags) -> CastlingMode {
    if flags.chess960 {
        CastlingMode::Chess960
    } else {
        CastlingMode::Standard
    }
}

fn parse_position(position: &str, flags: &VariantFlags) -> Result<Chess, SessionError> {
    let fen: Fen = position
        .parse()
        .map_err(|e| SessionError::InvalidPosition(format!("{position}: {e}")))?;
    fen.into_position(castling_mode(flags))
        .map_err(|e| SessionError::InvalidPosition(format!("{position}: {e}")))
}

fn play_token(pos: &mut Chess, token: &str) -> Result<(), SessionError> {
    let uci: UciMove = token
        .parse()
        .map_err(|_| SessionError::AmbiguousOrInvalidMove(token.to_string()))?;
    let mv = uci
        .to_move(&*pos)
        .map_err(|_| SessionError::AmbiguousOrInvalidMove(token.to_string()))?;
    pos.play_unchecked(mv);
    Ok(())
}

/// Replay `moves` from `position`. Stops at the first illegal token.
fn replay(position: &str, moves: &[String], flags: &VariantFlags) -> Result<Chess, SessionError> {
    let mut pos = parse_position(position, flags)?;
    for token in moves {
        play_token(&mut pos, token)?;
    }
    Ok(pos)
}

fn to_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// FEN without move counters, used as a repetition key.
fn repetition_key(pos: &Chess) -> String {
    to_fen(pos)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

impl StandardChessOracle {
    fn is_repetition(&self, position: &str, moves: &[String], flags: &VariantFlags) -> bool {
        let Ok(mut pos) = parse_position(position, flags) else {
            return false;
        };
        let mut seen: HashMap<String, usize> = HashMap::new();
        *seen.entry(repetition_key(&pos)).or_default() += 1;
        for token in moves {
            if play_token(&mut pos, token).is_err() {
                return false;
            }
            *seen.entry(repetition_key(&pos)).or_default() += 1;
        }
        seen.get(&repetition_key(&pos)).copied().unwrap_or(0) >= REPETITION_LIMIT
    }
}

impl MoveOracle for StandardChessOracle {
    fn supports(&self, variant: &str) -> bool {
        variant == STANDARD_VARIANT
    }

    fn starting_position(&self, variant: &str) -> Result<String, SessionError> {
        if !self.supports(variant) {
            return Err(SessionError::UnknownVariant(variant.to_string()));
        }
        Ok(to_fen(&Chess::default()))
    }

    fn validate_position(&self, variant: &str, position: &str) -> Result<(), SessionError> {
        if !self.supports(variant) {
            return Err(SessionError::UnknownVariant(variant.to_string()));
        }
        parse_position(position, &VariantFlags::default()).map(|_| ())
    }

    fn legal_moves(
        &self,
        _variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> Vec<String> {
        let Ok(pos) = replay(position, moves, flags) else {
            return Vec::new();
        };
        let mode = castling_mode(flags);
        pos.legal_moves()
            .iter()
            .map(|mv| mv.to_uci(mode).to_string())
            .collect()
    }

    fn notation(
        &self,
        _variant: &str,
        position: &str,
        token: &str,
        flags: &VariantFlags,
    ) -> Option<String> {
        let mut pos = parse_position(position, flags).ok()?;
        let uci: UciMove = token.parse().ok()?;
        let mv = uci.to_move(&pos).ok()?;
        Some(SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string())
    }

    fn apply_moves(
        &self,
        _variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> Result<String, SessionError> {
        replay(position, moves, flags).map(|pos| to_fen(&pos))
    }

    fn notation_history(
        &self,
        _variant: &str,
        start_position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> Vec<String> {
        let Ok(mut pos) = parse_position(start_position, flags) else {
            return Vec::new();
        };
        let mut history = Vec::with_capacity(moves.len());
        for token in moves {
            let Some(mv) = token
                .parse::<UciMove>()
                .ok()
                .and_then(|uci| uci.to_move(&pos).ok())
            else {
                break;
            };
            history.push(SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string());
        }
        history
    }

    fn terminal_value(
        &self,
        variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> TerminalValue {
        let Ok(pos) = replay(position, moves, flags) else {
            return TerminalValue::None;
        };
        if pos.is_checkmate() {
            // Reported from the mated side's point of view.
            TerminalValue::NegMate
        } else if pos.is_stalemate()
            || pos.is_insufficient_material()
            || self.optional_game_end(variant, position, moves, flags)
        {
            TerminalValue::Draw
        } else {
            TerminalValue::None
        }
    }

    fn optional_game_end(
        &self,
        _variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> bool {
        let Ok(pos) = replay(position, moves, flags) else {
            return false;
        };
        pos.halfmoves() >= FIFTY_MOVE_HALFMOVES || self.is_repetition(position, moves, flags)
    }

    fn immediate_game_end(
        &self,
        _variant: &str,
        _position: &str,
        _moves: &[String],
        _flags: &VariantFlags,
    ) -> bool {
        false
    }

    fn insufficient_material(
        &self,
        _variant: &str,
        position: &str,
        moves: &[String],
        flags: &VariantFlags,
    ) -> [bool; 2] {
        match replay(position, moves, flags) {
            Ok(pos) => [
                pos.has_insufficient_material(Color::White),
                pos.has_insufficient_material(Color::Black),
            ],
            Err(_) => [false, false],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn moves(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_starting_position() {
        let oracle = StandardChessOracle;
        assert_eq!(oracle.starting_position("chess").unwrap(), START);
        assert_eq!(
            oracle.starting_position("shogi"),
            Err(SessionError::UnknownVariant("shogi".into()))
        );
    }

    #[test]
    fn test_legal_moves_from_start() {
        let oracle = StandardChessOracle;
        let legal = oracle.legal_moves("chess", START, &[], &VariantFlags::default());
        assert_eq!(legal.len(), 20);
        assert!(legal.contains(&"e2e4".to_string()));
        assert!(legal.contains(&"g1f3".to_string()));
    }

    #[test]
    fn test_notation_includes_check_suffix() {
        let oracle = StandardChessOracle;
        let flags = VariantFlags::default();
        let pos = oracle
            .apply_moves("chess", START, &moves(&["f2f3", "e7e5", "g2g4"]), &flags)
            .unwrap();
        assert_eq!(
            oracle.notation("chess", &pos, "d8h4", &flags).as_deref(),
            Some("Qh4#")
        );
        assert_eq!(oracle.notation("chess", &pos, "a1a8", &flags), None);
    }

    #[test]
    fn test_apply_moves_rejects_illegal_token() {
        let oracle = StandardChessOracle;
        let err = oracle
            .apply_moves("chess", START, &moves(&["e2e5"]), &VariantFlags::default())
            .unwrap_err();
        assert_eq!(err, SessionError::AmbiguousOrInvalidMove("e2e5".into()));
    }

    #[test]
    fn test_checkmate_is_negative_for_side_to_move() {
        let oracle = StandardChessOracle;
        let flags = VariantFlags::default();
        let fools_mate = moves(&["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(oracle.legal_moves("chess", START, &fools_mate, &flags).is_empty());
        assert_eq!(
            oracle.terminal_value("chess", START, &fools_mate, &flags),
            TerminalValue::NegMate
        );
    }

    #[test]
    fn test_threefold_repetition_is_optional_end() {
        let oracle = StandardChessOracle;
        let flags = VariantFlags::default();
        let shuffle = moves(&[
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
        ]);
        assert!(oracle.optional_game_end("chess", START, &shuffle, &flags));
        assert!(!oracle.optional_game_end("chess", START, &shuffle[..4], &flags));
    }

    #[test]
    fn test_insufficient_material_per_side() {
        let oracle = StandardChessOracle;
        let flags = VariantFlags::default();
        let kings_and_knight = "8/8/4k3/8/8/3NK3/8/8 w - - 0 1";
        assert_eq!(
            oracle.insufficient_material("chess", kings_and_knight, &[], &flags),
            [true, true]
        );
        let rook = "8/8/4k3/8/8/3RK3/8/8 w - - 0 1";
        assert_eq!(
            oracle.insufficient_material("chess", rook, &[], &flags),
            [false, true]
        );
    }

    #[test]
    fn test_notation_history() {
        let oracle = StandardChessOracle;
        let history = oracle.notation_history(
            "chess",
            START,
            &moves(&["e2e4", "e7e5", "g1f3"]),
            &VariantFlags::default(),
        );
        assert_eq!(history, vec!["e4", "e5", "Nf3"]);
    }
}

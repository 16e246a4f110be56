//! What the automated opponent does with an engine evaluation.

use std::fmt;

/// Centipawn magnitude at or below which a self-play position counts as drawish.
pub const DRAWISH_CP: i32 = 10;
/// Consecutive drawish evaluations before self-play offers a draw.
pub const DRAWISH_STREAK: u32 = 10;
/// Self-play never offers a draw before this many plies.
pub const MIN_DRAW_PLY: usize = 80;

/// Engine score from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Centipawns(i32),
    /// Mate in N moves; negative when the side to move is getting mated.
    Mate(i32),
}

impl Evaluation {
    /// Parse an evaluation token such as `cp -34` or `mate 2`.
    pub fn parse(token: &str) -> Option<Evaluation> {
        let mut parts = token.split_whitespace();
        let kind = parts.next()?;
        let value: i32 = parts.next()?.parse().ok()?;
        match kind {
            "cp" => Some(Evaluation::Centipawns(value)),
            "mate" => Some(Evaluation::Mate(value)),
            _ => None,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "cp {cp}"),
            Evaluation::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Session facts the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionContext {
    pub self_play: bool,
    /// Forwarded to the engine for strength; not used for branching.
    pub skill: i32,
    pub consecutive_drawish: u32,
    pub ply_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Move,
    Resign,
    OfferDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: BotAction,
    /// New value for the session's drawish counter.
    pub consecutive_drawish: u32,
}

pub fn decide(eval: Option<Evaluation>, ctx: &DecisionContext) -> Decision {
    if !ctx.self_play && eval == Some(Evaluation::Mate(-1)) {
        return Decision {
            action: BotAction::Resign,
            consecutive_drawish: ctx.consecutive_drawish,
        };
    }

    if ctx.self_play {
        if let Some(Evaluation::Centipawns(cp)) = eval {
            if cp.abs() <= DRAWISH_CP {
                let streak = ctx.consecutive_drawish + 1;
                let action = if streak >= DRAWISH_STREAK && ctx.ply_count >= MIN_DRAW_PLY {
                    BotAction::OfferDraw
                } else {
                    BotAction::Move
                };
                return Decision {
                    action,
                    consecutive_drawish: streak,
                };
            }
        }
    }

    Decision {
        action: BotAction::Move,
        consecutive_drawish: 0,
    }
}

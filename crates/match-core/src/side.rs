//! Sides and match outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Index into per-side flag arrays (white = 0, black = 1).
    pub fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Side),
    Draw,
}

impl Outcome {
    /// PGN-style result string: "1-0", "0-1", "1/2-1/2"
    pub fn result_str(self) -> &'static str {
        match self {
            Outcome::Winner(Side::White) => "1-0",
            Outcome::Winner(Side::Black) => "0-1",
            Outcome::Draw => "1/2-1/2",
        }
    }

    pub fn parse(s: &str) -> Option<Outcome> {
        match s {
            "1-0" => Some(Outcome::Winner(Side::White)),
            "0-1" => Some(Outcome::Winner(Side::Black)),
            "1/2-1/2" => Some(Outcome::Draw),
            _ => None,
        }
    }
}

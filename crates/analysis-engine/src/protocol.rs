//! UCI-style line protocol: command formatting and output parsing.

use std::sync::LazyLock;

use regex::Regex;

pub const READY_PROBE: &str = "isready";
pub const READY_MARKER: &str = "readyok";
pub const BESTMOVE_MARKER: &str = "bestmove";
pub const QUIT: &str = "quit";

static EVAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:cp|mate) -?\d+").expect("valid eval regex"));

/// One search to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub variant: String,
    pub chess960: bool,
    pub skill: i32,
    /// Position the move list starts from.
    pub position: String,
    pub moves: Vec<String>,
    pub movetime_ms: u64,
}

/// Search result: the move to play and the last score reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResponse {
    pub best_move: String,
    /// `cp <n>` or `mate <n>`, if the engine printed any score.
    pub evaluation: Option<String>,
}

pub fn load_command(rules_file: &str) -> String {
    format!("load {rules_file}")
}

pub fn setoption_command(name: &str, value: impl std::fmt::Display) -> String {
    format!("setoption name {name} value {value}")
}

pub fn position_command(position: &str, moves: &[String]) -> String {
    if moves.is_empty() {
        format!("position fen {position}")
    } else {
        format!("position fen {position} moves {}", moves.join(" "))
    }
}

pub fn go_command(movetime_ms: u64) -> String {
    format!("go movetime {movetime_ms}")
}

/// Move token following `bestmove`, if `line` is a search-complete line.
pub fn parse_bestmove(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    if parts.next()? != BESTMOVE_MARKER {
        return None;
    }
    parts.next().map(str::to_string)
}

/// Last centipawn or mate score anywhere in `lines`.
pub fn last_evaluation<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .rev()
        .find_map(|line| EVAL_PATTERN.find_iter(line.as_ref()).last())
        .map(|m| m.as_str().to_string())
}

//! Flat, serializable form of a [`Session`] for the persistence layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::oracle::MoveOracle;
use crate::session::Session;
use crate::side::Outcome;
use crate::variant::variant_info;

/// Every field is a string, number, boolean or list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub variant: String,
    pub white_player: String,
    pub black_player: String,
    pub bot_identity: Option<String>,
    pub start_position: String,
    pub moves_applied: Vec<String>,
    pub current_position: String,
    pub white_offered_draw: bool,
    pub black_offered_draw: bool,
    pub white_requested_takeback: bool,
    pub black_requested_takeback: bool,
    pub premove: Option<String>,
    pub bot_skill: i32,
    pub consecutive_drawish: u32,
    pub active: bool,
    /// "1-0", "0-1", "1/2-1/2" once finished.
    pub result: Option<String>,
    /// RFC 3339 timestamp.
    pub started_at: String,
}

impl From<&Session> for SessionSnapshot {
    fn from(s: &Session) -> Self {
        SessionSnapshot {
            variant: s.variant.clone(),
            white_player: s.white_player.clone(),
            black_player: s.black_player.clone(),
            bot_identity: s.bot_identity.clone(),
            start_position: s.start_position.clone(),
            moves_applied: s.moves_applied.clone(),
            current_position: s.current_position.clone(),
            white_offered_draw: s.draw_offered[0],
            black_offered_draw: s.draw_offered[1],
            white_requested_takeback: s.takeback_requested[0],
            black_requested_takeback: s.takeback_requested[1],
            premove: s.premove.clone(),
            bot_skill: s.bot_skill,
            consecutive_drawish: s.consecutive_drawish,
            active: s.active,
            result: s.outcome.map(|o| o.result_str().to_string()),
            started_at: s.started_at.to_rfc3339(),
        }
    }
}

impl SessionSnapshot {
    /// Rebuild a live session. The position is recomputed through the
    /// oracle rather than trusted from the snapshot.
    pub fn restore(self, oracle: Arc<dyn MoveOracle>) -> Result<Session, SessionError> {
        if !oracle.supports(&self.variant) {
            return Err(SessionError::UnknownVariant(self.variant));
        }
        let flags = variant_info(&self.variant).flags;
        let current_position =
            oracle.apply_moves(&self.variant, &self.start_position, &self.moves_applied, &flags)?;
        let started_at = DateTime::parse_from_rfc3339(&self.started_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Session {
            oracle,
            variant: self.variant,
            flags,
            white_player: self.white_player,
            black_player: self.black_player,
            bot_identity: self.bot_identity,
            start_position: self.start_position,
            moves_applied: self.moves_applied,
            current_position,
            draw_offered: [self.white_offered_draw, self.black_offered_draw],
            takeback_requested: [self.white_requested_takeback, self.black_requested_takeback],
            premove: self.premove,
            bot_skill: self.bot_skill,
            consecutive_drawish: self.consecutive_drawish,
            active: self.active,
            outcome: self.result.as_deref().and_then(Outcome::parse),
            started_at,
        })
    }

    /// Export as a flat key/value map.
    pub fn to_flat_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }

    pub fn from_flat_map(
        map: serde_json::Map<String, serde_json::Value>,
    ) -> Result<SessionSnapshot, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(map))
    }
}

impl Session {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(self)
    }
}

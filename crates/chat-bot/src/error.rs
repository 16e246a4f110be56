//! Bot error types and the text a chat user sees for each.

use analysis_engine::EngineError;
use match_core::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Variant not allowed: {0}")]
    VariantNotAllowed(String),

    #[error("This game has no bot")]
    NoBot,

    #[error("No finished game to rematch")]
    NoRematch,

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl BotError {
    /// Reply text for the chat user. Engine and storage failures are
    /// logged here since the user only sees a summary.
    pub fn user_message(&self, allowed_variants: &[String]) -> String {
        match self {
            BotError::Session(e) => session_message(e),
            BotError::Engine(e) => {
                tracing::error!("Engine error: {e}");
                format!("The engine failed: {e}. Try --botmove to retry.")
            }
            BotError::UnknownCommand(cmd) => format!("Unknown command `{cmd}`. Try --help."),
            BotError::Usage(usage) => format!("Usage: {usage}"),
            BotError::VariantNotAllowed(_) => {
                format!("**Available variants:** {}", allowed_variants.join(", "))
            }
            BotError::NoBot => "There is no bot in this game.".to_string(),
            BotError::NoRematch => "There is no finished game to rematch.".to_string(),
            BotError::Io(e) => {
                tracing::error!("Snapshot I/O error: {e}");
                "Internal error.".to_string()
            }
            BotError::Snapshot(e) => {
                tracing::error!("Snapshot encoding error: {e}");
                "Internal error.".to_string()
            }
        }
    }
}

fn session_message(e: &SessionError) -> String {
    match e {
        SessionError::UnknownVariant(v) => format!("Unknown variant: {v}"),
        SessionError::InvalidPosition(_) => "That start position is not valid.".to_string(),
        SessionError::SessionInactive | SessionError::NoSession => "No game is active.".to_string(),
        SessionError::SessionAlreadyActive => "There is already a game going on!".to_string(),
        SessionError::NotYourTurn => "It's not your turn!".to_string(),
        SessionError::PremoveOnOwnTurn => "It's your turn, just move!".to_string(),
        SessionError::AmbiguousOrInvalidMove(text) => {
            format!("Invalid or ambiguous move: {text}")
        }
        SessionError::NothingToTakeBack => "There are no moves to take back.".to_string(),
        SessionError::DuplicateOffer => "You already made that offer.".to_string(),
        SessionError::NoOffer => "No offers active.".to_string(),
        SessionError::NotAParticipant(_) => "You're not playing!".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_read_naturally() {
        let allowed = vec!["chess".to_string()];
        assert_eq!(
            BotError::from(SessionError::NotYourTurn).user_message(&allowed),
            "It's not your turn!"
        );
        assert_eq!(
            BotError::from(SessionError::NotAParticipant("eve".into())).user_message(&allowed),
            "You're not playing!"
        );
    }

    #[test]
    fn test_variant_message_lists_allowed() {
        let allowed = vec!["chess".to_string(), "crazyhouse".to_string()];
        assert_eq!(
            BotError::VariantNotAllowed("shogi".into()).user_message(&allowed),
            "**Available variants:** chess, crazyhouse"
        );
    }

    #[test]
    fn test_engine_error_mentions_retry() {
        let msg = BotError::from(EngineError::Closed).user_message(&[]);
        assert!(msg.starts_with("The engine failed"));
        assert!(msg.contains("--botmove"));
    }
}

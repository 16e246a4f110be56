//! Session error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Invalid start position: {0}")]
    InvalidPosition(String),

    #[error("No game is active")]
    SessionInactive,

    #[error("A game is already in progress")]
    SessionAlreadyActive,

    #[error("No game found for this conversation")]
    NoSession,

    #[error("It's not your turn")]
    NotYourTurn,

    #[error("Premoves can only be set while your opponent is to move")]
    PremoveOnOwnTurn,

    #[error("Ambiguous or illegal move: {0}")]
    AmbiguousOrInvalidMove(String),

    #[error("No moves to take back")]
    NothingToTakeBack,

    #[error("Offer already made")]
    DuplicateOffer,

    #[error("No offer to accept")]
    NoOffer,

    #[error("{0} is not playing in this game")]
    NotAParticipant(String),
}

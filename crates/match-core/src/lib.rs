//! Match sessions for chat-played games.
//!
//! Rules come from a [`MoveOracle`]; this crate tracks turns, offers,
//! premoves and results, and decides what an automated opponent does with
//! an engine evaluation.

pub mod chess_oracle;
pub mod error;
pub mod notation;
pub mod oracle;
pub mod policy;
pub mod registry;
pub mod render;
pub mod session;
pub mod side;
pub mod snapshot;
pub mod variant;

pub use chess_oracle::StandardChessOracle;
pub use error::SessionError;
pub use oracle::{MoveOracle, TerminalValue, VariantFlags};
pub use policy::{decide, BotAction, Decision, DecisionContext, Evaluation};
pub use registry::{SessionHandle, SessionRegistry};
pub use render::RenderRequest;
pub use session::{MoveReport, PremoveReport, Session};
pub use side::{Outcome, Side};
pub use snapshot::SessionSnapshot;

pub mod commands;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod store;

pub use config::BotConfig;
pub use dispatcher::{Dispatcher, Reply};
pub use error::BotError;
pub use store::SnapshotStore;

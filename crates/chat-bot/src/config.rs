//! Bot settings from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use analysis_engine::EngineConfig;

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Identity the automated opponent plays under.
    pub bot_name: String,
    pub allowed_variants: Vec<String>,
    /// Skill a new bot game starts at.
    pub default_skill: i32,
    pub snapshot_path: PathBuf,
    /// Pause between a move and the opponent's queued premove.
    pub premove_settle: Duration,
    pub self_play_max_plies: usize,
    pub engine: EngineConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: "bot".to_string(),
            allowed_variants: vec!["chess".to_string()],
            default_skill: 20,
            snapshot_path: PathBuf::from("data/sessions.bin"),
            premove_settle: Duration::from_millis(250),
            self_play_max_plies: 400,
            engine: EngineConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bot_name: env::var("BOT_NAME").unwrap_or(defaults.bot_name),
            allowed_variants: env::var("ALLOWED_VARIANTS")
                .ok()
                .map(|v| parse_variant_list(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.allowed_variants),
            default_skill: env::var("BOT_SKILL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_skill),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            premove_settle: env::var("PREMOVE_SETTLE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.premove_settle),
            self_play_max_plies: env::var("SELF_PLAY_MAX_PLIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.self_play_max_plies),
            engine: EngineConfig::from_env(),
        }
    }

    pub fn allows(&self, variant: &str) -> bool {
        self.allowed_variants.iter().any(|v| v == variant)
    }
}

fn parse_variant_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

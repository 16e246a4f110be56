//! Engine configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to the engine binary
    pub engine_path: String,

    /// Variant definitions file sent with `load`
    pub variants_file: Option<PathBuf>,

    /// Directory searched for `<variant>.nnue` eval files
    pub nnue_dir: PathBuf,

    /// Search threads per engine process
    pub threads: usize,

    /// Hash table size in MB
    pub hash_mb: u32,

    /// Think time per automated move
    pub movetime_ms: u64,

    /// Grace period on top of the think time before an engine is
    /// considered stalled
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_path: "fairy-stockfish".to_string(),
            variants_file: None,
            nnue_dir: PathBuf::from("nnues"),
            threads: num_cpus::get(),
            hash_mb: 64,
            movetime_ms: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            engine_path: env::var("ENGINE_PATH").unwrap_or(defaults.engine_path),
            variants_file: env::var("VARIANTS_FILE").ok().map(PathBuf::from),
            nnue_dir: env::var("NNUE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.nnue_dir),
            threads: env::var("ENGINE_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.threads),
            hash_mb: env::var("ENGINE_HASH_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.hash_mb),
            movetime_ms: env::var("BOT_MOVETIME_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.movetime_ms),
            timeout: env::var("ENGINE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Eval file for `variant`, if one is present on disk.
    pub fn eval_file(&self, variant: &str) -> Option<PathBuf> {
        let path = self.nnue_dir.join(format!("{variant}.nnue"));
        path.is_file().then_some(path)
    }
}

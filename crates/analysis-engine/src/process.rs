//! External analysis process speaking the UCI line protocol (async I/O).
//!
//! A background task reads the engine's stdout and forwards each line over
//! a channel; every wait on that channel has a deadline, so a silent engine
//! surfaces as [`EngineError::ProtocolStall`] instead of hanging the caller.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::protocol::{self, AnalysisRequest, AnalysisResponse};

const LINE_BUFFER: usize = 256;
const QUIT_GRACE: Duration = Duration::from_secs(2);

type EngineInput = Box<dyn AsyncWrite + Send + Unpin>;

/// One engine process, used for a single request and then quit.
pub struct AnalysisProcess {
    child: Option<Child>,
    stdin: EngineInput,
    lines: mpsc::Receiver<String>,
    reader: JoinHandle<()>,
    timeout: Duration,
}

impl AnalysisProcess {
    /// Spawn the engine and send the variant setup commands.
    pub async fn launch(
        config: &EngineConfig,
        variant: &str,
        skill: i32,
        chess960: bool,
    ) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Launch(format!("{}: {e}", config.engine_path)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Launch("engine stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Launch("engine stdout unavailable".into()))?;

        let mut engine = Self::from_io(stdin, stdout, config.timeout);
        engine.child = Some(child);
        engine.configure(config, variant, skill, chess960).await?;
        Ok(engine)
    }

    /// Wrap an already-connected engine. Used for processes started
    /// elsewhere and for scripted engines in tests.
    pub fn from_io<W, R>(writer: W, reader: R, timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let reader = tokio::spawn(forward_lines(reader, tx));
        Self {
            child: None,
            stdin: Box::new(writer),
            lines: rx,
            reader,
            timeout,
        }
    }

    /// Variant, strength and eval-file setup. Sent before any analysis.
    pub async fn configure(
        &mut self,
        config: &EngineConfig,
        variant: &str,
        skill: i32,
        chess960: bool,
    ) -> Result<(), EngineError> {
        if let Some(file) = &config.variants_file {
            self.send(&protocol::load_command(&file.display().to_string()))
                .await?;
        }
        self.send(&protocol::setoption_command("UCI_Variant", variant))
            .await?;
        self.send(&protocol::setoption_command("Skill Level", skill))
            .await?;
        self.send(&protocol::setoption_command("UCI_Chess960", chess960))
            .await?;
        if let Some(nnue) = config.eval_file(variant) {
            self.send(&protocol::setoption_command("EvalFile", nnue.display()))
                .await?;
        }
        Ok(())
    }

    /// Send a command line to the engine
    pub async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "engine <");
        self.stdin.write_all(format!("{cmd}\n").as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self, deadline: Instant) -> Result<String, EngineError> {
        match timeout_at(deadline, self.lines.recv()).await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(EngineError::Closed),
            Err(_) => Err(EngineError::ProtocolStall(self.timeout)),
        }
    }

    /// Readiness round-trip: send `isready` and collect everything the
    /// engine prints before `readyok`.
    pub async fn sync(&mut self) -> Result<Vec<String>, EngineError> {
        self.send(protocol::READY_PROBE).await?;
        let deadline = Instant::now() + self.timeout;
        let mut output = Vec::new();
        loop {
            let line = self.next_line(deadline).await?;
            if line == protocol::READY_MARKER {
                return Ok(output);
            }
            output.push(line);
        }
    }

    /// Resource tuning, confirmed with a readiness round-trip.
    pub async fn allocate(
        &mut self,
        threads: Option<usize>,
        memory_mb: Option<u32>,
    ) -> Result<Vec<String>, EngineError> {
        if let Some(threads) = threads {
            self.send(&protocol::setoption_command("Threads", threads))
                .await?;
        }
        if let Some(memory_mb) = memory_mb {
            self.send(&protocol::setoption_command("Hash", memory_mb))
                .await?;
        }
        self.sync().await
    }

    /// Search for the best move within the request's time budget.
    pub async fn analyze(
        &mut self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, EngineError> {
        self.send(&protocol::position_command(&request.position, &request.moves))
            .await?;
        self.send(&protocol::go_command(request.movetime_ms))
            .await?;

        let deadline = Instant::now() + Duration::from_millis(request.movetime_ms) + self.timeout;
        let mut output: Vec<String> = Vec::new();
        loop {
            let line = self.next_line(deadline).await?;
            if let Some(best_move) = protocol::parse_bestmove(&line) {
                let evaluation = protocol::last_evaluation(&output);
                debug!(best_move = %best_move, evaluation = ?evaluation, "engine search complete");
                return Ok(AnalysisResponse {
                    best_move,
                    evaluation,
                });
            }
            output.push(line);
        }
    }

    /// Send `quit` and release the process. Consumes the handle, so it
    /// runs at most once; dropping without quitting kills the child.
    pub async fn quit(mut self) {
        let _ = self.send(protocol::QUIT).await;
        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(QUIT_GRACE, child.wait()).await {
                Ok(_) => {}
                Err(_) => {
                    warn!("Engine ignored quit, killing");
                    let _ = child.kill().await;
                }
            }
        }
        self.reader.abort();
    }
}

impl Drop for AnalysisProcess {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        self.reader.abort();
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim().to_string();
                debug!(line = %line, "engine >");
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read engine output");
                break;
            }
        }
    }
}

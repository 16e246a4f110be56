//! Console front end: `<conversation> <user> <message>` lines in,
//! `[<conversation>] ...` lines out.
//!
//! Every conversation gets its own worker task. Lines for one conversation
//! are handled in arrival order while other conversations carry on.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use match_core::RenderRequest;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::commands::parse_console_line;
use crate::dispatcher::{Dispatcher, Reply};

struct Worker {
    tx: mpsc::UnboundedSender<(String, String)>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn spawn(
        dispatcher: Arc<Dispatcher>,
        conversation: String,
        output: mpsc::UnboundedSender<String>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, String)>();
        let handle = tokio::spawn(async move {
            while let Some((user, message)) = rx.recv().await {
                for reply in dispatcher.handle(&conversation, &user, &message).await {
                    for line in format_reply(&conversation, &reply) {
                        if output.send(line).is_err() {
                            return;
                        }
                    }
                }
            }
        });
        Self { tx, handle }
    }
}

/// Read lines until end of input, a read error or `shutdown`, then wait
/// for every conversation's queued lines to be handled.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the loop.
pub async fn run<R, S>(
    dispatcher: Arc<Dispatcher>,
    mut input: R,
    shutdown: S,
    output: mpsc::UnboundedSender<String>,
) where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut workers: HashMap<String, Worker> = HashMap::new();
    let mut buf = Vec::new();
    tokio::pin!(shutdown);

    loop {
        buf.clear();
        let read = tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted, shutting down");
                break;
            }
            read = input.read_until(b'\n', &mut buf) => read,
        };
        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("Failed to read console input: {}", e);
                break;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        let Some((conversation, user, message)) = parse_console_line(&line) else {
            warn!("Ignoring malformed line: {}", line.trim_end());
            continue;
        };
        let worker = workers.entry(conversation.to_string()).or_insert_with(|| {
            Worker::spawn(dispatcher.clone(), conversation.to_string(), output.clone())
        });
        if worker
            .tx
            .send((user.to_string(), message.to_string()))
            .is_err()
        {
            warn!(conversation, "Conversation worker has stopped");
        }
    }

    for (conversation, worker) in workers {
        drop(worker.tx);
        if let Err(e) = worker.handle.await {
            error!(conversation = %conversation, "Conversation worker failed: {}", e);
        }
    }
}

/// Console lines for one reply, each prefixed with its conversation.
pub fn format_reply(conversation: &str, reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Text(text) => text
            .lines()
            .map(|line| format!("[{conversation}] {line}"))
            .collect(),
        Reply::Board(board) => vec![format!("[{conversation}] {}", board_line(board))],
    }
}

fn board_line(board: &RenderRequest) -> String {
    let last = board.last_move.as_deref().unwrap_or("-");
    let view = if board.upside_down { "black" } else { "white" };
    format!(
        "<board {} pieces={} view={view} last={last}> {}",
        board.variant, board.info.piece_folder, board.position
    )
}

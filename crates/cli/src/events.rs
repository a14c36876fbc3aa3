//! Line-delimited event output.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Pending lines before `emit` waits for the writer
const WRITE_QUEUE: usize = 16;

/// Sink for named events delivered to a connected client
#[async_trait]
pub trait EventEmitter: Send + Sync {
    /// Queue an event. Delivery failures are never reported to the caller.
    async fn emit(&self, event: &str, body: Value);
}

/// Wire envelope for one event
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventPacket<'a> {
    #[serde(rename = "Type")]
    pub packet_type: &'static str,
    pub event: &'a str,
    pub body: Value,
}

impl<'a> EventPacket<'a> {
    pub fn new(event: &'a str, body: Value) -> Self {
        Self {
            packet_type: "event",
            event,
            body,
        }
    }
}

/// Writes each event as one JSON line from a background task
pub struct StdioEventEmitter {
    tx: Option<mpsc::Sender<String>>,
    writer: Option<JoinHandle<()>>,
}

async fn run_write_loop<W: AsyncWrite + Unpin>(mut write: W, mut rx: mpsc::Receiver<String>) {
    while let Some(line) = rx.recv().await {
        let result = async {
            write.write_all(line.as_bytes()).await?;
            write.write_all(b"\n").await?;
            write.flush().await
        }
        .await;
        if let Err(e) = result {
            log::warn!("Event writer stopped: {e}");
            break;
        }
    }
}

impl StdioEventEmitter {
    /// Emitter writing to process stdout
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    pub fn new<W: AsyncWrite + Unpin + Send + 'static>(write: W) -> Self {
        let (tx, rx) = mpsc::channel(WRITE_QUEUE);
        let writer = tokio::spawn(run_write_loop(write, rx));
        Self {
            tx: Some(tx),
            writer: Some(writer),
        }
    }

    /// Stop accepting events and wait until queued lines are written
    pub async fn shutdown(mut self) {
        self.tx.take();
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                log::warn!("Event writer task failed: {e}");
            }
        }
    }
}

#[async_trait]
impl EventEmitter for StdioEventEmitter {
    async fn emit(&self, event: &str, body: Value) {
        let line = match serde_json::to_string(&EventPacket::new(event, body)) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Failed to serialize event '{event}': {e}");
                return;
            }
        };
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        if tx.send(line).await.is_err() {
            log::warn!("Dropped event '{event}': writer is gone");
        }
    }
}

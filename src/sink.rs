// src/sink.rs
// =============================================================================
// The email sink: a single background task that owns the output file.
//
// Crawl steps never touch the file. They push addresses into a channel and
// move on; one writer task appends each one as its own line, in the order
// the channel delivers them. That keeps lines from interleaving no matter
// how many pages are being crawled at once.
//
// Lifecycle:
//   EmailSink::start(path)  -> creates the file, spawns the writer
//   sink.sender()           -> cheap handles for producers
//   sink.close().await      -> waits for the queue to drain
//
// A failed write is logged and the writer keeps going with the next item.
//
// Rust concepts:
// - mpsc channels: many producers, one consumer
// - JoinHandle: awaiting a spawned task's return value
// =============================================================================

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot create output file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Producer side. Clone it freely; sending never waits on file I/O.
#[derive(Debug, Clone)]
pub struct EmailSender {
    tx: UnboundedSender<String>,
}

impl EmailSender {
    pub fn submit(&self, email: String) {
        if let Err(err) = self.tx.send(email) {
            warn!(email = %err.0, "email sink is closed, dropping address");
        }
    }
}

#[derive(Debug)]
pub struct EmailSink {
    sender: EmailSender,
    writer: JoinHandle<usize>,
    path: PathBuf,
}

impl EmailSink {
    // Creates (or truncates) `path` and starts the writer task.
    // Must be called from inside a tokio runtime.
    pub async fn start(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await.map_err(|source| SinkError::Create {
            path: path.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_lines(file, rx, path.clone()));

        debug!(path = %path.display(), "email sink started");

        Ok(Self {
            sender: EmailSender { tx },
            writer,
            path,
        })
    }

    pub fn sender(&self) -> EmailSender {
        self.sender.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Closes our end of the channel and waits for the writer to finish the
    // backlog. Other EmailSender clones must already be dropped, otherwise
    // this waits for them too.
    //
    // Returns the number of lines successfully written.
    pub async fn close(self) -> usize {
        let Self { sender, writer, path } = self;
        drop(sender);

        match writer.await {
            Ok(written) => {
                debug!(path = %path.display(), written, "email sink closed");
                written
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "email writer task failed");
                0
            }
        }
    }
}

// The consumer loop. Runs until every sender is gone.
//
// Parameters:
//   out: where lines go (the output file in practice)
//   rx: receiving end of the email channel
//   path: only used in log messages
//
// Returns: number of lines written successfully. A failed line is logged
// and skipped; the loop keeps consuming.
async fn write_lines<W>(mut out: W, mut rx: UnboundedReceiver<String>, path: PathBuf) -> usize
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;

    while let Some(email) = rx.recv().await {
        let line = format!("{}\n", email);

        let result = match out.write_all(line.as_bytes()).await {
            Ok(()) => out.flush().await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => written += 1,
            Err(err) => {
                error!(path = %path.display(), email = %email, error = %err, "failed to write email");
            }
        }
    }

    written
}

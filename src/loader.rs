// src/loader.rs

//! Asynchronous file loading.
//!
//! A read is requested from the UI thread, performed on the tokio runtime,
//! and its outcome collected later with [`Loader::poll`]. Every request gets
//! a new generation number; results of older requests that complete late
//! are discarded, so the table always shows the most recently chosen file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::data_loader::{DataLoader, TableData};
use crate::error::{Result, ViewerError};

#[derive(Debug)]
pub struct Loaded {
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<TableData>,
}

/// Reads `path` as text (invalid UTF-8 is replaced, not rejected) and parses it.
pub async fn read_table(path: &Path, parser: &dyn DataLoader) -> Result<TableData> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ViewerError::read(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let table = parser.parse(&text);
    info!(path = %path.display(), bytes = bytes.len(), records = table.len(), "file loaded");
    Ok(table)
}

pub struct Loader {
    runtime: Handle,
    parser: Arc<dyn DataLoader>,
    tx: UnboundedSender<Loaded>,
    rx: UnboundedReceiver<Loaded>,
    generation: u64,
}

impl Loader {
    pub fn new(runtime: Handle, parser: Arc<dyn DataLoader>) -> Self {
        let (tx, rx) = unbounded_channel();
        Loader {
            runtime,
            parser,
            tx,
            rx,
            generation: 0,
        }
    }

    /// Starts reading `path` and returns the request's generation.
    pub fn request(&mut self, path: impl Into<PathBuf>) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let path = path.into();
        let parser = Arc::clone(&self.parser);
        let tx = self.tx.clone();
        debug!(generation, path = %path.display(), "load requested");

        self.runtime.spawn(async move {
            let result = read_table(&path, parser.as_ref()).await;
            if let Err(e) = &result {
                warn!(generation, error = %e, "load failed");
            }
            // The receiver lives as long as the loader; a send error only
            // means the viewer is shutting down.
            let _ = tx.send(Loaded {
                generation,
                path,
                result,
            });
        });
        generation
    }

    fn is_current(&self, loaded: &Loaded) -> bool {
        if loaded.generation == self.generation {
            true
        } else {
            debug!(
                stale = loaded.generation,
                current = self.generation,
                "discarding superseded load"
            );
            false
        }
    }

    /// Non-blocking: the outcome of the latest request, if it has finished.
    pub fn poll(&mut self) -> Option<Loaded> {
        while let Ok(loaded) = self.rx.try_recv() {
            if self.is_current(&loaded) {
                return Some(loaded);
            }
        }
        None
    }

    /// Waits for the outcome of the latest request.
    pub async fn next(&mut self) -> Option<Loaded> {
        while let Some(loaded) = self.rx.recv().await {
            if self.is_current(&loaded) {
                return Some(loaded);
            }
        }
        None
    }
}

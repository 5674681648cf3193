//! Store configuration.

use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

const LOG_TARGET: &str = "shelf_json_store";

/// Whether reads participate in the per-collection lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadConsistency {
    /// Reads take the shared side of the collection lock, so they never
    /// interleave with a write or delete on the same collection.
    #[default]
    Locked,
    /// Reads touch only the filesystem. A reader may see a collection listing
    /// while a delete is removing it, but never a partially written document.
    Unlocked,
}

/// Where the store sends its log records.
///
/// With no custom logger, records go through the global `log` facade, so the
/// binary's choice of backend (e.g. `env_logger`) decides where they end up.
#[derive(Clone, Default)]
pub struct LogSink {
    logger: Option<Arc<dyn Log>>,
}

impl LogSink {
    pub fn new(logger: Arc<dyn Log>) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    pub(crate) fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match &self.logger {
            Some(logger) => {
                let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
                if logger.enabled(&metadata) {
                    logger.log(&Record::builder().metadata(metadata).args(args).build());
                }
            }
            None => log::log!(target: LOG_TARGET, level, "{}", args),
        }
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("custom", &self.logger.is_some())
            .finish()
    }
}

/// Options accepted by [`crate::JSONLocalStore::open`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub sink: LogSink,
    pub read_consistency: ReadConsistency,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send log records to `logger` instead of the global `log` facade.
    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.sink = LogSink::new(logger);
        self
    }

    pub fn with_read_consistency(mut self, read_consistency: ReadConsistency) -> Self {
        self.read_consistency = read_consistency;
        self
    }
}

/// A [`Log`] implementation that keeps every record in memory.
///
/// Handy for asserting on what a store logged.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: std::sync::Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records logged so far.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Log for MemoryLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

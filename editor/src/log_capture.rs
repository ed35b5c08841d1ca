use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::Mutex;

/// A single captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub timestamp: Instant,
}

/// Ring buffer of captured log entries.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_capacity: usize,
}

impl LogBuffer {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_capacity.min(1024)),
            max_capacity,
        }
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Formats entries at `min_level` or more severe whose message or
    /// target contains `filter` (case-insensitive), oldest first.
    pub fn render(&self, start: Instant, min_level: log::Level, filter: &str) -> Vec<String> {
        let filter_lower = filter.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.level <= min_level)
            .filter(|e| {
                filter_lower.is_empty()
                    || e.message.to_lowercase().contains(&filter_lower)
                    || e.target.to_lowercase().contains(&filter_lower)
            })
            .map(|e| {
                let elapsed = e.timestamp.saturating_duration_since(start);
                format!(
                    "{:>5}.{:03} {} {} {}",
                    elapsed.as_secs(),
                    elapsed.subsec_millis(),
                    level_label(e.level),
                    e.target,
                    e.message
                )
            })
            .collect()
    }
}

pub fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

/// Global shared log buffer.
static LOG_BUFFER: OnceLock<Arc<Mutex<LogBuffer>>> = OnceLock::new();

/// Returns the shared log buffer handle, if [`install`] has run.
pub fn log_buffer() -> Option<Arc<Mutex<LogBuffer>>> {
    LOG_BUFFER.get().cloned()
}

/// Custom logger that wraps `env_logger` and captures entries to the ring buffer.
struct LogCapture {
    inner: env_logger::Logger,
    buffer: Arc<Mutex<LogBuffer>>,
}

impl log::Log for LogCapture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            // Forward to env_logger (prints to stderr)
            self.inner.log(record);

            self.buffer.lock().push(LogEntry {
                level: record.level(),
                target: record.target().to_owned(),
                message: format!("{}", record.args()),
                timestamp: Instant::now(),
            });
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the capturing logger. Call once, before the first log line.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn install(capacity: usize) -> Result<Arc<Mutex<LogBuffer>>, log::SetLoggerError> {
    let buffer = LOG_BUFFER
        .get_or_init(|| Arc::new(Mutex::new(LogBuffer::new(capacity))))
        .clone();

    let inner =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let max_level = inner.filter();

    let logger = LogCapture {
        inner,
        buffer: Arc::clone(&buffer),
    };

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(buffer)
}

//! In-memory logger

use parking_lot::Mutex;

use super::traits::Logger;

/// One captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: &'static str,
    pub message: String,
}

/// A logger that keeps every record in memory
///
/// Handy for asserting on diagnostics that have no other observable effect.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Whether any record at `level` contains `needle`
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    fn push(&self, level: &'static str, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let logger = MemoryLogger::new();
        logger.info("first");
        logger.warn("second");

        let records = logger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, "info");
        assert!(logger.contains("warn", "sec"));
        assert!(!logger.contains("error", "second"));
    }
}

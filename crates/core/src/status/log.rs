//! Bounded operator log.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Default number of retained log lines.
pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// Severity of an operator log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// FIFO ring of formatted log lines. Appending beyond capacity evicts the
/// oldest line.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl Serialize for LogBuffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.lines.iter())
    }
}

/// Format a line as `[HH:MM:SS] [LEVEL] message` using local time.
pub(super) fn format_line(level: LogLevel, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        level,
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_evicts_oldest() {
        let mut buffer = LogBuffer::new(3);
        for i in 0..5 {
            buffer.push(format!("line {}", i));
        }
        let lines: Vec<&String> = buffer.iter().collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_default_capacity() {
        let mut buffer = LogBuffer::default();
        for i in 0..201 {
            buffer.push(format!("line {}", i));
        }
        assert_eq!(buffer.len(), 200);
        assert_eq!(buffer.iter().next().unwrap(), "line 1");
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let mut buffer = LogBuffer::new(0);
        buffer.push("a".to_string());
        buffer.push("b".to_string());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_format_line() {
        let line = format_line(LogLevel::Success, "done");
        // "[HH:MM:SS] " prefix is 11 chars
        assert_eq!(&line[0..1], "[");
        assert_eq!(&line[9..11], "] ");
        assert!(line.ends_with("[SUCCESS] done"));
    }

    #[test]
    fn test_serializes_as_array() {
        let mut buffer = LogBuffer::new(5);
        buffer.push("x".to_string());
        let json = serde_json::to_value(&buffer).unwrap();
        assert_eq!(json, serde_json::json!(["x"]));
    }
}

//! Bounded, append-only message log shown to the player.

use std::collections::{vec_deque, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};

pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Move,
    Rejection,
    /// Hard server errors; rendered as an attention-grabbing notice
    Error,
    /// Frames the translator could not interpret, verbatim
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Monotonic across the whole session, even after old entries are dropped
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub kind: LogKind,
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.at.format("%H:%M:%S");
        match self.kind {
            LogKind::Error => write!(f, "[{time}] !! {}", self.text),
            LogKind::Rejection => write!(f, "[{time}] x {}", self.text),
            LogKind::Raw => write!(f, "[{time}] > {}", self.text),
            LogKind::Info | LogKind::Move => write!(f, "[{time}] {}", self.text),
        }
    }
}

/// Ring buffer of log entries; the oldest entry is dropped once full.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
            next_seq: 0,
        }
    }

    /// Append an entry and return its sequence number.
    pub fn push(&mut self, kind: LogKind, text: impl Into<String>) -> u64 {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(LogEntry {
            seq,
            at: Utc::now(),
            kind,
            text: text.into(),
        });
        seq
    }

    pub fn entries(&self) -> vec_deque::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Entries with a sequence number of at least `seq`.
    pub fn entries_since(&self, seq: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |entry| entry.seq >= seq)
    }

    /// Sequence number the next entry will get.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_entries_are_dropped() {
        let mut log = MessageLog::new(3);
        for i in 0..5 {
            log.push(LogKind::Info, format!("line {i}"));
        }

        let texts: Vec<&str> = log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.next_seq(), 5);
    }

    #[test]
    fn test_entries_since() {
        let mut log = MessageLog::default();
        log.push(LogKind::Info, "a");
        let seq = log.push(LogKind::Move, "b");
        log.push(LogKind::Error, "c");

        let since: Vec<&str> = log.entries_since(seq).map(|e| e.text.as_str()).collect();
        assert_eq!(since, vec!["b", "c"]);
        assert_eq!(log.entries_since(log.next_seq()).count(), 0);
    }

    #[test]
    fn test_display_marks_errors() {
        let mut log = MessageLog::new(0);
        log.push(LogKind::Error, "Game is full");
        let line = log.last().map(ToString::to_string).unwrap_or_default();
        assert!(line.ends_with("!! Game is full"));
        assert_eq!(log.len(), 1);
    }
}

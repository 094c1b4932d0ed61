//! Incremental retrieval of the bridge's append-only message log.
//!
//! The bridge numbers every line with a strictly increasing id and answers
//! `GET /api/messages?after=<cursor>` with the lines newer than the cursor,
//! plus the newest id it knows in `X-Last-Message-Id`. We keep only that
//! cursor and a bounded window of rendered lines.

use std::collections::VecDeque;

use serde_json::{Number, Value};
use tracing::debug;

use crate::config::DEFAULT_MESSAGE_BUFFER_CAPACITY;

pub const LAST_MESSAGE_ID_HEADER: &str = "X-Last-Message-Id";

/// Largest float that still names exactly one integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCursorStore {
    cursor: u64,
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for MessageCursorStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MESSAGE_BUFFER_CAPACITY)
    }
}

impl MessageCursorStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            cursor: 0,
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Path and query for the next poll.
    pub fn next_query(&self, path: &str) -> String {
        format!("{path}?after={}", self.cursor)
    }

    /// Shrinking evicts the oldest lines right away.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict_overflow();
    }

    /// Folds one poll response into the store.
    pub fn ingest(&mut self, raw_body: &str, header_cursor: Option<&str>) {
        self.advance_cursor(header_cursor);

        if raw_body.trim().is_empty() {
            return;
        }

        let mut appended = 0usize;
        for line in raw_body.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            self.lines.push_back(display_line(line));
            appended += 1;
        }
        self.evict_overflow();

        debug!(
            appended,
            retained = self.lines.len(),
            cursor = self.cursor,
            "message log ingested"
        );
    }

    /// Visible log text, rebuilt from the whole buffer.
    pub fn render(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }

    fn advance_cursor(&mut self, header_cursor: Option<&str>) {
        let Some(raw) = header_cursor else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(id) if id > self.cursor => self.cursor = id,
            Ok(_) => {}
            Err(_) => debug!(header = raw, "ignoring unparsable message cursor"),
        }
    }

    fn evict_overflow(&mut self) {
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }
}

/// JSON lines are pretty-printed; anything else is shown verbatim.
fn display_line(line: &str) -> String {
    match serde_json::from_str::<Value>(line) {
        Ok(mut value) => {
            normalize_numbers(&mut value);
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| line.to_string())
        }
        Err(_) => line.to_string(),
    }
}

/// `21.0` prints as `21`, the way a browser's `JSON.stringify` shows it.
fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        Value::Number(n) => {
            if let Some(whole) = whole_float(n) {
                *n = Number::from(whole);
            }
        }
        _ => {}
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole_float(n: &Number) -> Option<i64> {
    let f = n.as_f64().filter(|_| n.is_f64())?;
    (f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER).then_some(f as i64)
}

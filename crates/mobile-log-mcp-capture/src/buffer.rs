//! Bounded line buffering for captured log output.

use std::collections::VecDeque;

/// Splits a raw output chunk into log lines.
///
/// Lines are split on `\n` with a trailing `\r` stripped; blank and
/// whitespace-only fragments are dropped. A chunk ending mid-line yields the
/// partial line as-is - fragments are not reassembled across chunk
/// boundaries, trading occasional split lines for throughput.
pub fn split_chunk(chunk: &str) -> impl Iterator<Item = &str> {
    chunk
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

/// Fixed-capacity FIFO of log lines, oldest evicted first.
#[derive(Debug)]
pub struct LineBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineBuffer {
    /// Create an empty buffer holding at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    /// Append one line, evicting from the front while over capacity.
    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Split a raw chunk into lines and push each. Returns the number of
    /// lines pushed.
    pub fn extend_from_chunk(&mut self, chunk: &str) -> usize {
        let mut pushed = 0;
        for line in split_chunk(chunk) {
            self.push(line.to_string());
            pushed += 1;
        }
        pushed
    }

    /// The last `min(n, len)` lines in original order, non-mutating.
    pub fn snapshot_tail(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    /// Empty the buffer, returning the number of lines removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.lines.len();
        self.lines.clear();
        removed
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of lines the buffer retains.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_within_capacity() {
        let mut buffer = LineBuffer::new(10);
        buffer.push("a".to_string());
        buffer.push("b".to_string());

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.snapshot_tail(10), vec!["a", "b"]);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut buffer = LineBuffer::new(10_000);
        for i in 0..10_050 {
            buffer.push(format!("line {i}"));
        }

        assert_eq!(buffer.len(), 10_000);
        let tail = buffer.snapshot_tail(10_000);
        assert_eq!(tail.first().unwrap(), "line 50");
        assert_eq!(tail.last().unwrap(), "line 10049");
    }

    #[test]
    fn test_snapshot_tail_returns_newest_in_order() {
        let mut buffer = LineBuffer::new(10);
        for line in ["a", "b", "c"] {
            buffer.push(line.to_string());
        }

        assert_eq!(buffer.snapshot_tail(2), vec!["b", "c"]);
        // Asking for more than is buffered returns everything.
        assert_eq!(buffer.snapshot_tail(100), vec!["a", "b", "c"]);
        // Non-mutating.
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_clear_returns_count() {
        let mut buffer = LineBuffer::new(10);
        for i in 0..5 {
            buffer.push(format!("line {i}"));
        }

        assert_eq!(buffer.clear(), 5);
        assert!(buffer.is_empty());
        assert_eq!(buffer.clear(), 0);
    }

    #[test]
    fn test_split_chunk_drops_blank_fragments() {
        let lines: Vec<&str> = split_chunk("one\n\n   \ntwo\n").collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_split_chunk_strips_carriage_returns() {
        let lines: Vec<&str> = split_chunk("one\r\ntwo\r\n").collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_split_chunk_keeps_trailing_partial_line() {
        // No reassembly across chunks: a chunk ending mid-line yields the
        // fragment as its own line.
        let lines: Vec<&str> = split_chunk("complete\npartia").collect();
        assert_eq!(lines, vec!["complete", "partia"]);
    }

    #[test]
    fn test_extend_from_chunk_counts_pushed() {
        let mut buffer = LineBuffer::new(10);
        let pushed = buffer.extend_from_chunk("a\nb\n\nc\n");
        assert_eq!(pushed, 3);
        assert_eq!(buffer.snapshot_tail(10), vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_len_never_exceeds_capacity(
            lines in proptest::collection::vec("[a-z]{1,8}", 0..200),
            capacity in 1usize..50,
        ) {
            let mut buffer = LineBuffer::new(capacity);
            for line in &lines {
                buffer.push(line.clone());
            }

            prop_assert!(buffer.len() <= capacity);

            // The buffer holds exactly the newest lines, in push order.
            let expected: Vec<String> = lines
                .iter()
                .skip(lines.len().saturating_sub(capacity))
                .cloned()
                .collect();
            prop_assert_eq!(buffer.snapshot_tail(capacity), expected);
        }
    }
}

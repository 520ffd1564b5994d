use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::git::log_stream::drain_utf8_prefix;

/// Indentation-based structural complexity of a whole text.
///
/// Every line with any content scores 1, plus 1 more when its
/// leading-whitespace depth strictly increased relative to the previous
/// non-empty line — entering a deeper nesting level is penalized once
/// per increase, not proportionally to how far the indent jumped.
/// Empty lines are skipped without resetting the depth tracker.
pub fn indent_complexity(text: &str) -> usize {
    let mut scorer = IndentScorer::new();
    scorer.feed(text);
    scorer.finish()
}

/// Incremental scorer for streamed file reads, with results identical
/// to [`indent_complexity`] on the concatenated input. A chunk boundary
/// inside a line is not a line break — only real newlines end a line —
/// and a trailing unterminated line is still scored by `finish`.
#[derive(Debug, Default)]
pub struct IndentScorer {
    buf: String,
    prev_depth: usize,
    count: usize,
}

impl IndentScorer {
    pub fn new() -> Self {
        IndentScorer::default()
    }

    pub fn feed(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
        while let Some(idx) = self.buf.find('\n') {
            let line: String = self.buf.drain(..idx + 1).collect();
            self.score_line(line.trim_end_matches('\n'));
        }
    }

    pub fn finish(mut self) -> usize {
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            self.score_line(&line);
        }
        self.count
    }

    fn score_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        let depth = line.chars().take_while(|c| c.is_whitespace()).count();
        if depth > self.prev_depth {
            self.count += 1;
        }
        self.prev_depth = depth;
        self.count += 1;
    }
}

/// Scores a file on disk, streaming its content through the scorer.
/// Missing, unreadable, or empty files score 0 and fall out of the
/// hotspot ranking naturally.
pub fn score_file(path: &Path) -> usize {
    let Ok(file) = File::open(path) else {
        return 0;
    };
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut scorer = IndentScorer::new();
    let mut pending: Vec<u8> = Vec::new();
    loop {
        let consumed = match reader.fill_buf() {
            Ok(data) if data.is_empty() => break,
            Ok(data) => {
                pending.extend_from_slice(data);
                data.len()
            }
            Err(_) => return 0,
        };
        reader.consume(consumed);
        scorer.feed(&drain_utf8_prefix(&mut pending));
    }
    if !pending.is_empty() {
        scorer.feed(&String::from_utf8_lossy(&pending));
    }
    scorer.finish()
}

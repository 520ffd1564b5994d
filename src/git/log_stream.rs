use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Commit, FileEntry};

/// Failure taxonomy for history ingestion. Per-line anomalies are not
/// represented here — they are skipped with a warning and never fail
/// the parse. Everything in this enum aborts the whole ingestion.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A header line did not carry hash, date, author, and message.
    /// Headers come from a well-formed producer, so this indicates a
    /// broken producer rather than noisy data.
    #[error("malformed commit header: {0}")]
    MalformedHeader(String),

    /// The log producer could not be started.
    #[error("failed to run git: {0}")]
    Spawn(String),

    /// Reading from the producer's output failed mid-stream.
    #[error("failed reading git output: {0}")]
    Read(String),

    /// The producer exited non-zero. Whatever was parsed before the
    /// failure is discarded — there is no partial-success mode.
    #[error("git log failed with exit code {code}: {stderr}")]
    Process { code: i32, stderr: String },
}

/// The four events a log producer can emit, in arrival order.
#[derive(Debug)]
pub enum LogEvent {
    Data(String),
    ErrData(String),
    Error(String),
    Close(i32),
}

/// Replays a full event sequence through a [`LogStreamParser`].
/// An `Error` event fails immediately; a `Close` event settles the
/// result. A stream that ends without either is itself a failure.
pub fn collect_commits<I>(events: I) -> Result<Vec<Commit>, LogError>
where
    I: IntoIterator<Item = LogEvent>,
{
    let mut parser = LogStreamParser::new();
    for event in events {
        match event {
            LogEvent::Data(chunk) => parser.push_chunk(&chunk)?,
            LogEvent::ErrData(chunk) => parser.push_err_chunk(&chunk),
            LogEvent::Error(message) => return Err(LogError::Spawn(message)),
            LogEvent::Close(code) => return parser.finish(code),
        }
    }
    Err(LogError::Read(
        "log stream ended without a completion event".to_string(),
    ))
}

/// Incremental parser for `git log --numstat --pretty=format:…` output
/// delivered as arbitrarily-sized text chunks.
///
/// A single buffer grows with each chunk; every time it contains a
/// blank line (`"\n\n"`) the text before it is drained and parsed as
/// one block. Numstat entries attach to the most recently parsed
/// header, which may have arrived in an earlier block — git separates
/// a commit's header from its numstat lines with a blank line, so a
/// commit regularly spans two blocks.
///
/// The parse result is identical no matter how the input is sliced:
/// 1-byte chunks and whole-output delivery produce the same commits.
pub struct LogStreamParser {
    buffer: String,
    commits: Vec<Commit>,
    stderr: String,
    skipped: usize,
}

impl Default for LogStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStreamParser {
    pub fn new() -> Self {
        LogStreamParser {
            buffer: String::new(),
            commits: Vec::new(),
            stderr: String::new(),
            skipped: 0,
        }
    }

    /// Appends one chunk of producer output and drains every complete
    /// block from the buffer.
    pub fn push_chunk(&mut self, chunk: &str) -> Result<(), LogError> {
        self.buffer.push_str(chunk);
        while let Some(idx) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..idx + 2).collect();
            self.parse_block(&block)?;
        }
        Ok(())
    }

    /// Accumulates producer error output; surfaced in the
    /// [`LogError::Process`] message if the producer exits non-zero.
    pub fn push_err_chunk(&mut self, chunk: &str) {
        self.stderr.push_str(chunk);
    }

    /// Number of numstat lines skipped as unparseable so far.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Settles the parse with the producer's exit code. A non-zero code
    /// fails regardless of how much valid data was already parsed.
    /// Anything still in the buffer is a record the producer never
    /// terminated with a blank line and is dropped — a truncated stream
    /// must not leak a partial commit.
    pub fn finish(self, exit_code: i32) -> Result<Vec<Commit>, LogError> {
        if exit_code != 0 {
            return Err(LogError::Process {
                code: exit_code,
                stderr: self.stderr.trim().to_string(),
            });
        }
        Ok(self.commits)
    }

    fn parse_block(&mut self, block: &str) -> Result<(), LogError> {
        for line in block.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with("'--") {
                self.commits.push(parse_header(line)?);
            } else {
                match parse_file_entry(line) {
                    Ok(Some(entry)) => match self.commits.last_mut() {
                        Some(commit) => commit.file_entries.push(entry),
                        None => {
                            self.skipped += 1;
                            eprintln!("Warning: numstat entry before any commit header: {line}");
                        }
                    },
                    // Binary-file marker: expected, not an anomaly.
                    Ok(None) => {}
                    Err(reason) => {
                        self.skipped += 1;
                        eprintln!("Warning: skipping numstat line ({reason})");
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parses a commit header: `'--<hash>--<date>--<author>--<message>'`.
///
/// The message may itself contain `--`, so the split stops after four
/// fields and the final field consumes the remainder. The quote that
/// closes the format string is stripped from the tail of the author
/// and message fields.
pub fn parse_header(line: &str) -> Result<Commit, LogError> {
    let malformed = || LogError::MalformedHeader(line.to_string());

    let body = line.strip_prefix('\'').unwrap_or(line);
    let body = body.strip_prefix("--").ok_or_else(malformed)?;

    let mut fields = body.splitn(4, "--");
    let (Some(hash), Some(date), Some(author), Some(message)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    let author = author.strip_suffix('\'').unwrap_or(author);
    let message = message.strip_suffix('\'').unwrap_or(message);

    if hash.is_empty() || date.is_empty() || author.is_empty() {
        return Err(malformed());
    }

    Ok(Commit {
        hash: hash.to_string(),
        date: date.to_string(),
        author: author.to_string(),
        message: message.to_string(),
        file_entries: Vec::new(),
    })
}

/// Parses one numstat line: `<added> <removed> <path>`. The path
/// consumes the remainder of the line, so paths containing spaces
/// survive. Binary files are reported as `- - <path>` and yield
/// `Ok(None)`; anything else unparseable is an `Err` for the caller
/// to skip with a warning.
pub fn parse_file_entry(line: &str) -> Result<Option<FileEntry>, String> {
    let too_few = || format!("expected 3 fields: {line}");

    let (added_raw, rest) = line.split_once(char::is_whitespace).ok_or_else(too_few)?;
    let (removed_raw, path_raw) = rest
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(too_few)?;
    let path_raw = path_raw.trim_start();
    if path_raw.is_empty() {
        return Err(too_few());
    }

    if added_raw == "-" || removed_raw == "-" {
        return Ok(None);
    }

    let added = added_raw
        .parse::<usize>()
        .map_err(|_| format!("non-numeric added count: {line}"))?;
    let removed = removed_raw
        .parse::<usize>()
        .map_err(|_| format!("non-numeric removed count: {line}"))?;

    match normalize_filename(path_raw) {
        Some(file_name) => Ok(Some(FileEntry {
            file_name,
            added,
            removed,
        })),
        None => Err(format!("unresolvable path: {line}")),
    }
}

/// Normalizes git rename notations:
///   "src/{old => new}/file.js" → "src/new/file.js"
///   "old-name => new-name"     → "new-name"
/// Our own producer passes --no-renames, but the parser accepts output
/// from any producer.
fn normalize_filename(raw: &str) -> Option<String> {
    if raw.contains('{') && raw.contains("=>") {
        let result = RENAME_RE.replace(raw, "$1").replace("//", "/");
        return if result.contains('{') {
            None
        } else {
            Some(result.trim().to_string())
        };
    }
    if raw.contains(" => ") {
        return raw.split(" => ").last().map(|s| s.trim().to_string());
    }
    let t = raw.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

static RENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^}]+ => ([^}]+)\}").expect("rename pattern is valid")
});

/// Drains the longest valid UTF-8 prefix of `pending` into a `String`,
/// leaving any trailing incomplete byte sequence for the next read.
/// Genuinely invalid bytes are replaced rather than carried forever.
pub(crate) fn drain_utf8_prefix(pending: &mut Vec<u8>) -> String {
    match std::str::from_utf8(pending) {
        Ok(_) => String::from_utf8_lossy(&std::mem::take(pending)).into_owned(),
        Err(e) if e.error_len().is_none() => {
            let tail = pending.split_off(e.valid_up_to());
            let head = std::mem::replace(pending, tail);
            String::from_utf8_lossy(&head).into_owned()
        }
        Err(_) => String::from_utf8_lossy(&std::mem::take(pending)).into_owned(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

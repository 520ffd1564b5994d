use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::git::log_stream::{drain_utf8_prefix, LogError, LogStreamParser};
use crate::types::Commit;

/// Runs `git log` for `repo` and streams its stdout through the chunk
/// parser. Chunks are whatever the pipe hands back; the parser
/// guarantees the result does not depend on their size.
///
/// `after` is an ISO `YYYY-MM-DD` cutoff. Validation happens at
/// configuration time, so it is passed through verbatim here.
pub fn run_git_log(repo: &Path, after: &str) -> Result<Vec<Commit>, LogError> {
    let mut args: Vec<String> = vec![
        "log".into(),
        "--all".into(),
        "--numstat".into(),
        "--date=short".into(),
        "--pretty=format:'--%h--%ad--%aN--%s'".into(),
        "--no-renames".into(),
    ];
    if !after.is_empty() {
        args.push(format!("--after={after}"));
    }

    let mut child = Command::new("git")
        .args(&args)
        .current_dir(repo)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| LogError::Spawn(e.to_string()))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| LogError::Spawn("failed to capture git stdout".to_string()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| LogError::Spawn("failed to capture git stderr".to_string()))?;

    // Drain stderr on its own thread so a chatty git can't deadlock the
    // stdout pipe.
    let stderr_reader = thread::spawn(move || {
        let mut text = String::new();
        let _ = stderr.read_to_string(&mut text);
        text
    });

    let mut parser = LogStreamParser::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stdout
            .read(&mut buf)
            .map_err(|e| LogError::Read(e.to_string()))?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);
        let chunk = drain_utf8_prefix(&mut pending);
        if !chunk.is_empty() {
            parser.push_chunk(&chunk)?;
        }
    }
    if !pending.is_empty() {
        parser.push_chunk(&String::from_utf8_lossy(&pending))?;
    }

    let status = child
        .wait()
        .map_err(|e| LogError::Read(e.to_string()))?;
    let stderr_text = stderr_reader.join().unwrap_or_default();
    parser.push_err_chunk(&stderr_text);

    if parser.skipped_lines() > 0 {
        eprintln!(
            "Warning: {} unparseable numstat line(s) were skipped",
            parser.skipped_lines()
        );
    }

    parser.finish(status.code().unwrap_or(-1))
}

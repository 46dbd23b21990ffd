//! # Input Module
//!
//! Reads the statusline payload and resolves token counters from, in order:
//! a direct token field on the payload, the session log, or nothing.
//!
//! Session logs are newline-delimited JSON. Lines that fail to parse are
//! skipped one by one, and a missing or unreadable log is simply empty.

use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::StatuslineError;
use crate::models::{HookJson, LegacyTranscript, LogRecord, UsageSnapshot};
use crate::utils::parse_timestamp;

/// Where the counters of a pass came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageSource {
    /// A token field on the stdin payload
    Direct(&'static str),
    /// Sum over assistant records of a session log
    SessionLog(PathBuf),
    /// Whole-file transcript with a `messages` array
    LegacyTranscript(PathBuf),
    /// Reused from the percentage cache
    Cache,
    None,
}

impl std::fmt::Display for UsageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(field) => write!(f, "payload field {field}"),
            Self::SessionLog(p) => write!(f, "session log {}", p.display()),
            Self::LegacyTranscript(p) => write!(f, "transcript {}", p.display()),
            Self::Cache => f.write_str("cache"),
            Self::None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReading {
    pub snapshot: UsageSnapshot,
    pub source: UsageSource,
}

impl UsageReading {
    pub fn none() -> Self {
        Self {
            snapshot: UsageSnapshot::default(),
            source: UsageSource::None,
        }
    }
}

/// Read the whole payload. A reader that fails counts as no input at all.
pub fn read_payload(mut reader: impl Read) -> Result<Vec<u8>, StatuslineError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|_| StatuslineError::InputAbsent)?;
    Ok(buf)
}

/// Parse the stdin payload. Blank input is `InputAbsent`, bad JSON is `Parse`.
pub fn parse_hook(input: &[u8]) -> Result<HookJson, StatuslineError> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(StatuslineError::InputAbsent);
    }
    Ok(serde_json::from_slice(input)?)
}

/// `transcript_path` from the payload, else `<dir>/projects/*/<session_id>.jsonl`
/// under the given Claude data directories.
pub fn locate_session_log(hook: &HookJson, claude_dirs: &[PathBuf]) -> Option<PathBuf> {
    if let Some(p) = hook.transcript_path() {
        return Some(PathBuf::from(p));
    }
    let file_name = format!("{}.jsonl", hook.session_id()?);
    for base in claude_dirs {
        let root = base.join("projects");
        if !root.is_dir() {
            continue;
        }
        let found = WalkDir::new(&root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .find(|e| e.file_type().is_file() && e.file_name() == file_name.as_str());
        if let Some(entry) = found {
            return Some(entry.into_path());
        }
    }
    None
}

fn log_records(path: &Path) -> impl Iterator<Item = LogRecord> {
    File::open(path)
        .ok()
        .map(BufReader::new)
        .into_iter()
        .flat_map(|reader| reader.lines())
        // a non-UTF-8 line is consumed before its error is returned, so only
        // that line is lost; any other read error ends the scan
        .map_while(|line| match line {
            Ok(l) => Some(Some(l)),
            Err(e) if e.kind() == ErrorKind::InvalidData => Some(None),
            Err(_) => None,
        })
        .flatten()
        .filter_map(|line| {
            let t = line.trim();
            if t.is_empty() {
                return None;
            }
            serde_json::from_str::<LogRecord>(t).ok()
        })
}

/// Sum usage over the log's assistant records, with the number of records
/// that contributed.
pub fn read_log_usage(path: &Path) -> (UsageSnapshot, usize) {
    let mut snapshot = UsageSnapshot::default();
    let mut counted = 0;
    for record in log_records(path) {
        if !record.counts_toward_usage() {
            continue;
        }
        if let Some(usage) = record.usage() {
            snapshot.add_usage(usage);
            counted += 1;
        }
    }
    (snapshot, counted)
}

/// Counters from a legacy whole-file transcript. Only `inputTokens` count;
/// a transcript whose inputs sum to zero has no usage.
pub fn read_legacy_transcript(path: &Path) -> Option<UsageSnapshot> {
    let content = fs::read_to_string(path).ok()?;
    let transcript: LegacyTranscript = serde_json::from_str(&content).ok()?;
    let input = transcript
        .messages
        .iter()
        .fold(0u64, |acc, m| acc.saturating_add(m.input_tokens.unwrap_or(0)));
    (input > 0).then(|| UsageSnapshot::from_total(input))
}

/// Timestamp of the first record that carries a parseable one. Scanning
/// stops at the first hit.
pub fn first_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    log_records(path).find_map(|record| record.raw_timestamp().and_then(parse_timestamp))
}

/// Counters from the session log, falling back to the legacy transcript shape
pub fn log_usage(path: &Path) -> UsageReading {
    let (snapshot, counted) = read_log_usage(path);
    if counted > 0 {
        return UsageReading {
            snapshot,
            source: UsageSource::SessionLog(path.to_path_buf()),
        };
    }
    match read_legacy_transcript(path) {
        Some(snapshot) => UsageReading {
            snapshot,
            source: UsageSource::LegacyTranscript(path.to_path_buf()),
        },
        None => UsageReading::none(),
    }
}

/// Apply the source priority: direct payload field, session log, nothing.
pub fn resolve_usage(hook: &HookJson, log_path: Option<&Path>) -> UsageReading {
    if let Some((snapshot, field)) = hook.direct_usage() {
        return UsageReading {
            snapshot,
            source: UsageSource::Direct(field),
        };
    }
    match log_path {
        Some(p) => {
            let reading = log_usage(p);
            if reading.snapshot.is_empty() {
                UsageReading::none()
            } else {
                reading
            }
        }
        None => UsageReading::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for l in lines {
            writeln!(f, "{l}").unwrap();
        }
        f
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn unreadable_input_is_absent() {
        let err = read_payload(BrokenPipe).unwrap_err();
        assert!(matches!(err, StatuslineError::InputAbsent));
        assert_eq!(err.recovery(), crate::error::Recovery::Silent);
        assert_eq!(read_payload(&b"{}"[..]).unwrap(), b"{}");
    }

    #[test]
    fn blank_input_is_absent() {
        assert!(matches!(parse_hook(b""), Err(StatuslineError::InputAbsent)));
        assert!(matches!(parse_hook(b" \n\t"), Err(StatuslineError::InputAbsent)));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(parse_hook(b"{\"model\":"), Err(StatuslineError::Parse(_))));
        assert!(matches!(parse_hook(b"\"just text\""), Err(StatuslineError::Parse(_))));
    }

    #[test]
    fn only_assistant_records_are_summed() {
        let f = log_file(&[
            r#"{"type":"user","message":{"usage":{"input_tokens":5000}}}"#,
            r#"{"type":"assistant","message":{"usage":{"input_tokens":10,"output_tokens":5}}}"#,
            r#"{"usage":{"input_tokens":1,"cache_creation_input_tokens":2}}"#,
            r#"{"type":"summary"}"#,
        ]);
        let (snap, counted) = read_log_usage(f.path());
        assert_eq!(counted, 2);
        assert_eq!(snap.input_tokens, 11);
        assert_eq!(snap.output_tokens, 5);
        assert_eq!(snap.cache_creation_tokens, 2);
    }

    #[test]
    fn missing_log_is_empty() {
        let (snap, counted) = read_log_usage(Path::new("/definitely/not/here.jsonl"));
        assert_eq!(counted, 0);
        assert!(snap.is_empty());
        assert_eq!(first_timestamp(Path::new("/definitely/not/here.jsonl")), None);
    }

    #[test]
    fn legacy_transcript_is_read_when_no_records_match() {
        let f = log_file(&[
            "{",
            r#"  "messages": [{"inputTokens": 1200, "outputTokens": 300}, {"inputTokens": 800}]"#,
            "}",
        ]);
        let reading = log_usage(f.path());
        assert_eq!(reading.source, UsageSource::LegacyTranscript(f.path().to_path_buf()));
        assert_eq!(reading.snapshot.total(), 2000);
        assert_eq!(reading.snapshot.output_tokens, 0);
    }

    #[test]
    fn legacy_output_tokens_alone_are_no_usage() {
        let f = log_file(&[r#"{"messages": [{"outputTokens": 900}, {"outputTokens": 40}]}"#]);
        assert_eq!(read_legacy_transcript(f.path()), None);
        assert_eq!(log_usage(f.path()), UsageReading::none());

        let hook: HookJson = serde_json::from_str(r#"{"inputTokens": 5000}"#).unwrap();
        let reading = resolve_usage(&hook, Some(f.path()));
        assert_eq!(reading.source, UsageSource::Direct("inputTokens"));
    }

    #[test]
    fn first_timestamp_skips_records_without_one() {
        let f = log_file(&[
            "garbage",
            r#"{"type":"summary"}"#,
            r#"{"type":"user","timestamp":"2025-10-18T09:12:00Z"}"#,
            r#"{"type":"user","timestamp":"2025-10-18T07:00:00Z"}"#,
        ]);
        let ts = first_timestamp(f.path()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-10-18T09:12:00+00:00");
    }

    #[test]
    fn nested_and_epoch_timestamps() {
        let f = log_file(&[r#"{"message":{"created_at":1760781600000}}"#]);
        let ts = first_timestamp(f.path()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-10-18T10:00:00+00:00");
    }

    #[test]
    fn direct_fields_beat_the_log() {
        let f = log_file(&[r#"{"type":"assistant","usage":{"input_tokens":10}}"#]);
        let hook: HookJson = serde_json::from_str(r#"{"current_tokens":777}"#).unwrap();
        let reading = resolve_usage(&hook, Some(f.path()));
        assert_eq!(reading.source, UsageSource::Direct("current_tokens"));
        assert_eq!(reading.snapshot.total(), 777);
    }

    #[test]
    fn zero_usage_log_resolves_to_none() {
        let f = log_file(&[r#"{"type":"assistant","usage":{"input_tokens":0}}"#]);
        let reading = resolve_usage(&HookJson::default(), Some(f.path()));
        assert_eq!(reading, UsageReading::none());
    }

    #[test]
    fn session_log_is_found_by_session_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let project = dir.path().join("projects").join("-home-me-repo");
        fs::create_dir_all(&project).unwrap();
        let log = project.join("abc-123.jsonl");
        fs::write(&log, "").unwrap();

        let hook: HookJson = serde_json::from_str(r#"{"session_id":"abc-123"}"#).unwrap();
        let found = locate_session_log(&hook, &[dir.path().to_path_buf()]);
        assert_eq!(found, Some(log));

        let other: HookJson = serde_json::from_str(r#"{"session_id":"zzz"}"#).unwrap();
        assert_eq!(locate_session_log(&other, &[dir.path().to_path_buf()]), None);
    }

    #[test]
    fn transcript_path_wins_over_session_lookup() {
        let hook: HookJson =
            serde_json::from_str(r#"{"session_id":"abc","transcript_path":"/tmp/t.jsonl"}"#)
                .unwrap();
        assert_eq!(
            locate_session_log(&hook, &[]),
            Some(PathBuf::from("/tmp/t.jsonl"))
        );
    }
}

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Claude data directories that contain a `projects/` folder.
/// `override_list` is a comma-separated list (CLAUDE_CONFIG_DIR); when it yields
/// nothing usable, ~/.claude then the XDG config dir are probed.
pub fn claude_paths(override_list: Option<&str>) -> Vec<PathBuf> {
    let mut paths = vec![];
    if let Some(list) = override_list {
        for p in list.split(',') {
            let p = p.trim();
            if p.is_empty() {
                continue;
            }
            let pb = PathBuf::from(p);
            if pb.join("projects").is_dir() {
                paths.push(pb);
            }
        }
        if !paths.is_empty() {
            return paths;
        }
    }
    let basedirs = directories::BaseDirs::new();
    let home = basedirs
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"));
    let xdg_config = basedirs
        .as_ref()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| home.join(".config"));
    for base in [home.join(".claude"), xdg_config.join("claude")] {
        if base.join("projects").is_dir() {
            paths.push(base);
        }
    }
    paths
}

/// ~/.claude, where the config file and percentage cache live
pub fn claude_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".claude"))
}

/// Terminal columns: the attached terminal, then $COLUMNS, then `fallback`.
pub fn terminal_width(fallback: usize) -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }
    env::var("COLUMNS")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(fallback)
}

pub fn value_as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Log timestamps: Unix epoch milliseconds, RFC 3339 (any offset), or a naive
/// ISO-8601 string which is read as local time.
pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(ms)
        }
        Value::String(s) => parse_iso_timestamp(s.trim()),
        _ => None,
    }
}

fn parse_iso_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    None
}

/// Cut `s` to at most `max` characters, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

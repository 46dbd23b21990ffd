//! # Status Module
//!
//! One rendering pass: payload → counters → percentage → reset label → line.
//! Every failure below this point is recovered here; the report records what
//! was recovered so `--debug` can show it.

use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::cache::PercentageCache;
use crate::config::{Config, ResetMode};
use crate::display::{LineStyle, compose_line, plan_line};
use crate::error::{Recovery, StatuslineError};
use crate::input::{
    UsageSource, first_timestamp, locate_session_log, parse_hook, resolve_usage,
};
use crate::models::{HookJson, UsageSnapshot};
use crate::reset::{next_reset, reset_label};
use crate::usage::percentage_of;

/// Everything a pass needs besides the payload and the clock
#[derive(Debug, Clone)]
pub struct StatusContext {
    pub config: Config,
    pub claude_dirs: Vec<PathBuf>,
    pub terminal_width: usize,
    pub color: bool,
}

impl StatusContext {
    pub fn new(config: Config) -> Self {
        let terminal_width = config.bar.fallback_width;
        Self {
            config,
            claude_dirs: Vec::new(),
            terminal_width,
            color: false,
        }
    }
}

/// Result of one pass, with the intermediate values for diagnostics
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// The single output line; empty means "print nothing"
    pub line: String,
    pub source: UsageSource,
    pub snapshot: UsageSnapshot,
    pub limit: u64,
    pub percentage: Option<u32>,
    pub plan: String,
    pub reset: Option<DateTime<Local>>,
    pub log_path: Option<PathBuf>,
    /// Errors that were recovered along the way
    pub recovered: Vec<String>,
}

impl StatusReport {
    fn new(line: String) -> Self {
        Self {
            line,
            source: UsageSource::None,
            snapshot: UsageSnapshot::default(),
            limit: 0,
            percentage: None,
            plan: String::new(),
            reset: None,
            log_path: None,
            recovered: Vec::new(),
        }
    }
}

/// Run one pass over `input` as of `now`.
pub fn build_status(
    input: &[u8],
    ctx: &StatusContext,
    now: DateTime<Local>,
    cache: Option<&dyn PercentageCache>,
) -> StatusReport {
    let mut recovered = Vec::new();
    let (hook, parsed) = match parse_hook(input) {
        Ok(hook) => (hook, true),
        Err(err) => match err.recovery() {
            Recovery::Silent => return StatusReport::new(String::new()),
            Recovery::StatusLine(line) => return StatusReport::new(line),
            Recovery::ZeroData | Recovery::Defaults => {
                recovered.push(err.to_string());
                (HookJson::default(), false)
            }
        },
    };

    let config = &ctx.config;
    let model = hook.model_info();
    let plan = config.plans.plan_for(model.as_ref()).to_string();
    // an explicit override beats the host's window size, which beats the table
    let limit = config
        .context_limit
        .or_else(|| hook.context_window_size())
        .unwrap_or_else(|| config.limit_for(model.as_ref()));
    let log_path = locate_session_log(&hook, &ctx.claude_dirs);

    // payload fields only; the log is read on a cache miss
    let mut reading = resolve_usage(&hook, None);
    let mut pct = (!reading.snapshot.is_empty())
        .then(|| percentage_of(&reading.snapshot, limit));

    // the cache only stands in for a session log this payload points at
    let cache = cache.filter(|_| parsed && log_path.is_some());
    if pct.is_none() {
        if let Some(cached) = cache.and_then(|c| c.get()) {
            reading.source = UsageSource::Cache;
            pct = Some(cached);
        } else {
            reading = resolve_usage(&hook, log_path.as_deref());
            if !reading.snapshot.is_empty() {
                let computed = percentage_of(&reading.snapshot, limit);
                if let Some(c) = cache {
                    if let Err(e) = c.put(computed) {
                        let err = StatuslineError::environment("cache", format!("{e:#}"));
                        recovered.push(err.to_string());
                    }
                }
                pct = Some(computed);
            }
        }
    }

    let mut report = StatusReport {
        source: reading.source,
        snapshot: reading.snapshot,
        limit,
        percentage: pct,
        plan,
        log_path,
        recovered,
        ..StatusReport::new(String::new())
    };

    let Some(pct) = pct else {
        report.line = plan_line(&report.plan);
        return report;
    };

    let session_start = match config.reset.mode {
        ResetMode::Session => report.log_path.as_deref().and_then(first_timestamp),
        _ => None,
    };
    let schedule = config.reset.schedule(session_start);
    report.reset = next_reset(&now, &schedule);
    let label = reset_label(&now, &schedule, config.reset.style);
    let style = LineStyle {
        terminal_width: ctx.terminal_width,
        min_bar_width: config.bar.min_width,
        layout: config.bar.layout,
        color: ctx.color,
    };
    report.line = compose_line(pct, &label, &style);
    report
}

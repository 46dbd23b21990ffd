//! Layered configuration: built-in defaults, then the optional JSON config
//! file, then CLI flags (which also carry their environment variables).

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeDelta, Utc, Weekday};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::cache::CACHE_TTL_SECONDS;
use crate::cli::{Args, LayoutArg, ResetModeArg, ResetStyleArg};
use crate::display::{DEFAULT_MIN_BAR_WIDTH, Layout};
use crate::models::ModelInfo;
use crate::reset::{DEFAULT_BUCKET_HOURS, ResetSchedule, ResetStyle, SESSION_DURATION_HOURS};
use crate::usage::{ContextLimits, PlanTable};
use crate::utils::{DEFAULT_TERMINAL_WIDTH, claude_home};

pub const CONFIG_FILE_NAME: &str = "usage-statusline.json";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    #[default]
    Buckets,
    Session,
    Weekly,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ResetSettings {
    pub mode: ResetMode,
    pub style: ResetStyle,
    pub bucket_hours: Vec<u32>,
    pub session_hours: i64,
    /// Weekday name or abbreviation, e.g. "sat"
    pub weekly_day: String,
    pub weekly_hour: u32,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            mode: ResetMode::Buckets,
            style: ResetStyle::Clock,
            bucket_hours: DEFAULT_BUCKET_HOURS.to_vec(),
            session_hours: SESSION_DURATION_HOURS,
            weekly_day: "sat".to_string(),
            weekly_hour: 0,
        }
    }
}

impl ResetSettings {
    /// Schedule for the configured mode. `session_start` only matters in
    /// session mode.
    pub fn schedule(&self, session_start: Option<DateTime<Utc>>) -> ResetSchedule {
        match self.mode {
            ResetMode::Buckets => ResetSchedule::Buckets(self.bucket_hours.clone()),
            ResetMode::Session => ResetSchedule::Session {
                start: session_start,
                duration: TimeDelta::hours(self.session_hours.max(0)),
            },
            ResetMode::Weekly => ResetSchedule::Weekly {
                day: self
                    .weekly_day
                    .trim()
                    .parse::<Weekday>()
                    .unwrap_or(Weekday::Sat),
                hour: self.weekly_hour.min(23),
            },
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BarSettings {
    pub min_width: usize,
    pub layout: Layout,
    /// Width used when the terminal size can't be detected
    pub fallback_width: usize,
}

impl Default for BarSettings {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_BAR_WIDTH,
            layout: Layout::BarFirst,
            fallback_width: DEFAULT_TERMINAL_WIDTH,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Applies to every model when set
    pub context_limit: Option<u64>,
    /// Replaces the limit of every large-context rule
    pub large_context_limit: Option<u64>,
    pub context_limits: ContextLimits,
    pub plans: PlanTable,
    pub reset: ResetSettings,
    pub bar: BarSettings,
    /// Percentage cache lifetime; 0 disables the cache
    pub cache_ttl_secs: i64,
    pub cache_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_limit: None,
            large_context_limit: None,
            context_limits: ContextLimits::default(),
            plans: PlanTable::default(),
            reset: ResetSettings::default(),
            bar: BarSettings::default(),
            cache_ttl_secs: CACHE_TTL_SECONDS,
            cache_path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        claude_home().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load `path`, or the default location when `None`. A missing default
    /// file yields the built-in defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read config {}", path.display()));
            }
        };
        Self::parse(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(content)?;
        if config.bar.min_width == 0 {
            bail!("bar.min_width must be at least 1");
        }
        if let Some(large) = config.large_context_limit {
            config.context_limits.set_large_limit(large);
        }
        Ok(config)
    }

    /// CLI flags (and their env vars) win over the file
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(limit) = args.context_limit {
            self.context_limit = Some(limit);
        }
        if let Some(mode) = args.reset_mode {
            self.reset.mode = match mode {
                ResetModeArg::Buckets => ResetMode::Buckets,
                ResetModeArg::Session => ResetMode::Session,
                ResetModeArg::Weekly => ResetMode::Weekly,
            };
        }
        if let Some(style) = args.reset_style {
            self.reset.style = match style {
                ResetStyleArg::Clock => ResetStyle::Clock,
                ResetStyleArg::Countdown => ResetStyle::Countdown,
            };
        }
        if let Some(layout) = args.layout {
            self.bar.layout = match layout {
                LayoutArg::BarFirst => Layout::BarFirst,
                LayoutArg::PercentFirst => Layout::PercentFirst,
            };
        }
        if let Some(min) = args.min_bar_width.filter(|w| *w > 0) {
            self.bar.min_width = min;
        }
    }

    pub fn limit_for(&self, model: Option<&ModelInfo>) -> u64 {
        self.context_limit
            .unwrap_or_else(|| self.context_limits.limit_for(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{DEFAULT_CONTEXT_LIMIT, LARGE_CONTEXT_LIMIT};

    fn sonnet_45() -> ModelInfo {
        ModelInfo {
            id: "claude-sonnet-4-5".into(),
            display_name: "Sonnet 4.5".into(),
        }
    }

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"{"reset":{"mode":"weekly","weekly_day":"Friday","weekly_hour":18},"unknown":1}"#,
        )
        .unwrap();
        assert_eq!(config.reset.mode, ResetMode::Weekly);
        assert_eq!(config.reset.bucket_hours, DEFAULT_BUCKET_HOURS.to_vec());
        assert_eq!(
            config.reset.schedule(None),
            ResetSchedule::Weekly {
                day: Weekday::Fri,
                hour: 18
            }
        );
        assert_eq!(config.bar, BarSettings::default());
    }

    #[test]
    fn large_context_limit_is_configurable() {
        let config = Config::parse(r#"{"large_context_limit":1200000}"#).unwrap();
        assert_eq!(config.limit_for(Some(&sonnet_45())), 1_200_000);
        assert_eq!(config.limit_for(None), DEFAULT_CONTEXT_LIMIT);
    }

    #[test]
    fn custom_tables_replace_the_defaults() {
        let config = Config::parse(
            r#"{"context_limits":{"default":128000,"rules":[{"pattern":"opus","limit":500000}]},
                "plans":{"default":"Team","rules":[]}}"#,
        )
        .unwrap();
        assert_eq!(config.limit_for(Some(&sonnet_45())), 128_000);
        assert_eq!(config.plans.plan_for(Some(&sonnet_45())), "Team");
    }

    #[test]
    fn invalid_files_are_errors() {
        assert!(Config::parse("{not json").is_err());
        assert!(Config::parse(r#"{"bar":{"min_width":0}}"#).is_err());
        assert!(Config::parse(r#"{"reset":{"mode":"hourly"}}"#).is_err());
    }

    #[test]
    fn args_override_the_file() {
        let mut config = Config::parse(r#"{"context_limit":5,"bar":{"layout":"percent-first"}}"#)
            .unwrap();
        let args = Args {
            context_limit: Some(300_000),
            reset_mode: Some(ResetModeArg::Session),
            reset_style: Some(ResetStyleArg::Countdown),
            layout: Some(LayoutArg::BarFirst),
            min_bar_width: Some(4),
            ..Args::default()
        };
        config.apply_args(&args);
        assert_eq!(config.limit_for(Some(&sonnet_45())), 300_000);
        assert_eq!(config.reset.mode, ResetMode::Session);
        assert_eq!(config.reset.style, ResetStyle::Countdown);
        assert_eq!(config.bar.layout, Layout::BarFirst);
        assert_eq!(config.bar.min_width, 4);
    }

    #[test]
    fn load_reads_an_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"cache_ttl_secs":5}"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.cache_ttl_secs, 5);
        assert_eq!(config.limit_for(Some(&sonnet_45())), LARGE_CONTEXT_LIMIT);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }
}

//! # Cache Module
//!
//! Single-slot cache for the last computed usage percentage. Freshness is
//! judged from the slot's last-modified time, so the clock and the storage are
//! injected and tests can age the slot without sleeping.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Default cache TTL in seconds
pub const CACHE_TTL_SECONDS: i64 = 60;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Raw slot contents plus the time it was last written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    pub contents: String,
    pub modified: DateTime<Utc>,
}

pub trait CacheStore {
    fn load(&self) -> Result<Option<CachedValue>>;
    fn save(&self, contents: &str) -> Result<()>;
}

/// Cache slot backed by one file; writes replace it atomically.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<Option<CachedValue>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read cache {}", self.path.display()));
            }
        };
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .with_context(|| format!("stat cache {}", self.path.display()))?;
        Ok(Some(CachedValue {
            contents,
            modified: modified.into(),
        }))
    }

    fn save(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create cache dir {}", parent.display()))?;
        }
        let tmp = self
            .path
            .with_extension(format!("tmp.{}", std::process::id()));
        fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace cache {}", self.path.display()))?;
        Ok(())
    }
}

/// Object-safe view of a percentage cache
pub trait PercentageCache {
    fn get(&self) -> Option<u32>;
    fn put(&self, percentage: u32) -> Result<()>;
}

pub struct PercentCache<C: Clock, S: CacheStore> {
    clock: C,
    store: S,
    ttl: TimeDelta,
}

impl<C: Clock, S: CacheStore> PercentCache<C, S> {
    pub fn new(clock: C, store: S, ttl_seconds: i64) -> Self {
        Self {
            clock,
            store,
            ttl: TimeDelta::seconds(ttl_seconds.max(0)),
        }
    }
}

impl<C: Clock, S: CacheStore> PercentageCache for PercentCache<C, S> {
    /// Cached percentage if the slot is younger than the TTL and well formed
    fn get(&self) -> Option<u32> {
        let cached = self.store.load().ok()??;
        let age = self.clock.now() - cached.modified;
        if age >= self.ttl {
            return None;
        }
        cached
            .contents
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|p| *p <= 100)
    }

    fn put(&self, percentage: u32) -> Result<()> {
        self.store.save(&percentage.min(100).to_string())
    }
}

/// ~/.claude/usage-statusline.cache
pub fn default_cache_path() -> Option<PathBuf> {
    crate::utils::claude_home().map(|d| d.join("usage-statusline.cache"))
}

//! # Reset Module
//!
//! Computes the next usage reset boundary and its display label.
//!
//! All functions are generic over the timezone so the binary can work in
//! `Local` while tests pin a fixed zone.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Timelike, Utc, Weekday};
use serde::Deserialize;

pub const DEFAULT_BUCKET_HOURS: [u32; 5] = [0, 5, 10, 15, 20];
pub const SESSION_DURATION_HOURS: i64 = 5;
pub const UNKNOWN_RESET: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetSchedule {
    /// Fixed daily boundaries at these local hours
    Buckets(Vec<u32>),
    /// First session activity plus a fixed duration
    Session {
        start: Option<DateTime<Utc>>,
        duration: TimeDelta,
    },
    /// Once a week at a local weekday and hour
    Weekly { day: Weekday, hour: u32 },
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResetStyle {
    /// "Today 15:00", "Tomorrow 00:00", "Sat 00:00"
    #[default]
    Clock,
    /// "2h 13m", "45m", "Now"
    Countdown,
}

/// Local datetime at `hour:00` on `date`. Skips forward an hour when the
/// wall-clock time falls in a DST gap.
fn at_hour<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
}

/// Smallest configured hour strictly after the current hour today, else the
/// first configured hour tomorrow.
pub fn next_bucket_boundary<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hours: &[u32],
) -> Option<DateTime<Tz>> {
    let mut hours: Vec<u32> = hours.iter().copied().filter(|h| *h < 24).collect();
    hours.sort_unstable();
    hours.dedup();
    let first = *hours.first()?;
    let tz = now.timezone();
    let today = now.date_naive();
    match hours.iter().find(|h| **h > now.hour()) {
        Some(h) => at_hour(&tz, today, *h),
        None => at_hour(&tz, today.succ_opt()?, first),
    }
}

pub fn session_reset<Tz: TimeZone>(
    now: &DateTime<Tz>,
    start: DateTime<Utc>,
    duration: TimeDelta,
) -> DateTime<Tz> {
    (start + duration).with_timezone(&now.timezone())
}

/// Next `day` at `hour:00` strictly after `now`
pub fn next_weekly_reset<Tz: TimeZone>(
    now: &DateTime<Tz>,
    day: Weekday,
    hour: u32,
) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let days_ahead = (7 + day.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let candidate = at_hour(&tz, today + TimeDelta::days(i64::from(days_ahead)), hour)?;
    if candidate > *now {
        Some(candidate)
    } else {
        at_hour(&tz, today + TimeDelta::days(i64::from(days_ahead) + 7), hour)
    }
}

pub fn next_reset<Tz: TimeZone>(
    now: &DateTime<Tz>,
    schedule: &ResetSchedule,
) -> Option<DateTime<Tz>> {
    match schedule {
        ResetSchedule::Buckets(hours) => next_bucket_boundary(now, hours),
        ResetSchedule::Session { start, duration } => {
            start.map(|s| session_reset(now, s, *duration))
        }
        ResetSchedule::Weekly { day, hour } => next_weekly_reset(now, *day, *hour),
    }
}

/// "Today HH:MM" / "Tomorrow HH:MM" / "Sat HH:MM", relative to `now`'s date
pub fn clock_label<Tz: TimeZone>(now: &DateTime<Tz>, reset: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let today = now.date_naive();
    let day = reset.date_naive();
    let hm = reset.format("%H:%M");
    if day == today {
        format!("Today {hm}")
    } else if today.succ_opt() == Some(day) {
        format!("Tomorrow {hm}")
    } else {
        reset.format("%a %H:%M").to_string()
    }
}

pub fn countdown_label<Tz: TimeZone>(now: &DateTime<Tz>, reset: &DateTime<Tz>) -> String {
    let secs = (reset.clone() - now.clone()).num_seconds();
    if secs <= 0 {
        return "Now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Label for the next reset, or [`UNKNOWN_RESET`] when it can't be computed
pub fn reset_label<Tz: TimeZone>(
    now: &DateTime<Tz>,
    schedule: &ResetSchedule,
    style: ResetStyle,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match next_reset(now, schedule) {
        Some(reset) => match style {
            ResetStyle::Clock => clock_label(now, &reset),
            ResetStyle::Countdown => countdown_label(now, &reset),
        },
        None => UNKNOWN_RESET.to_string(),
    }
}

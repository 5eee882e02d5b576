// SPDX-License-Identifier: MIT

//! CRON expression parsing, calendar matching, and the window-based trigger
//! rule that makes scheduling idempotent and restart-safe.
//!
//! This module is deliberately timezone-agnostic: it operates on
//! [`CalendarMinute`], a plain local-calendar tuple (year/month/day/weekday/
//! hour/minute). Converting a wall-clock instant into a `CalendarMinute` (in
//! whatever timezone the daemon runs in) is the caller's job — see
//! `cadence_daemon::tick` for the production conversion. Keeping the
//! conversion out of this module means every boundary case here is a pure,
//! deterministic unit test with no dependency on the host's timezone.

use chrono::{Datelike, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One field's accepted values, as a bitmask over the field's valid range.
///
/// Every field in a 5-field CRON expression fits comfortably in a `u64`
/// (the widest range is minutes, 0-59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FieldMask(u64);

impl FieldMask {
    fn set(&mut self, v: u32) {
        self.0 |= 1 << v;
    }

    fn contains(&self, v: u32) -> bool {
        (self.0 & (1 << v)) != 0
    }

    fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Errors produced while parsing a CRON field or full expression.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CronError {
    #[error("cron expression must have exactly 5 fields, found {0}: {1:?}")]
    WrongFieldCount(usize, String),
    #[error("empty field in cron expression: {0:?}")]
    EmptyField(String),
    #[error("value {value} out of range [{min}, {max}] in field {field:?}")]
    OutOfRange { field: String, value: u32, min: u32, max: u32 },
    #[error("invalid token {token:?} in field {field:?}")]
    InvalidToken { field: String, token: String },
    #[error("step of 0 is invalid in field {0:?}")]
    ZeroStep(String),
    #[error("schedule field may not be the literal `true`")]
    BareTrueNotAllowed,
    #[error("schedule field must be a string, array of strings, or `false`")]
    InvalidScheduleShape,
}

fn parse_field(field: &str, min: u32, max: u32) -> Result<FieldMask, CronError> {
    let mut mask = FieldMask::default();
    for item in field.split(',') {
        let item = item.trim();
        if item.is_empty() {
            return Err(CronError::EmptyField(field.to_string()));
        }
        let (range_part, step) = match item.split_once('/') {
            Some((r, s)) => {
                let step: u32 = s
                    .parse()
                    .map_err(|_| CronError::InvalidToken { field: field.to_string(), token: item.to_string() })?;
                if step == 0 {
                    return Err(CronError::ZeroStep(field.to_string()));
                }
                (r, step)
            }
            None => (item, 1),
        };

        let (lo, hi) = if range_part == "*" {
            (min, max)
        } else if let Some((a, b)) = range_part.split_once('-') {
            let a: u32 = a
                .parse()
                .map_err(|_| CronError::InvalidToken { field: field.to_string(), token: item.to_string() })?;
            let b: u32 = b
                .parse()
                .map_err(|_| CronError::InvalidToken { field: field.to_string(), token: item.to_string() })?;
            if a > b {
                return Err(CronError::InvalidToken { field: field.to_string(), token: item.to_string() });
            }
            (a, b)
        } else {
            let a: u32 = range_part
                .parse()
                .map_err(|_| CronError::InvalidToken { field: field.to_string(), token: item.to_string() })?;
            (a, a)
        };

        if lo < min || hi > max {
            return Err(CronError::OutOfRange { field: field.to_string(), value: if lo < min { lo } else { hi }, min, max });
        }

        let mut v = lo;
        while v <= hi {
            mask.set(v);
            v += step;
        }
    }

    if mask.is_empty() {
        return Err(CronError::EmptyField(field.to_string()));
    }
    Ok(mask)
}

/// A single parsed 5-field CRON expression: minute, hour, day-of-month,
/// month, day-of-week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    minute: FieldMask,
    hour: FieldMask,
    day_of_month: FieldMask,
    month: FieldMask,
    day_of_week: FieldMask,
    /// Whether the day-of-month field is something other than `*`.
    dom_restrictive: bool,
    /// Whether the day-of-week field is something other than `*`.
    dow_restrictive: bool,
}

impl CronExpr {
    /// Parse a 5-field CRON expression: `minute hour day-of-month month day-of-week`.
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::WrongFieldCount(fields.len(), expr.to_string()));
        }
        let minute = parse_field(fields[0], 0, 59)?;
        let hour = parse_field(fields[1], 0, 23)?;
        let day_of_month = parse_field(fields[2], 1, 31)?;
        let month = parse_field(fields[3], 1, 12)?;
        let day_of_week = parse_field(fields[4], 0, 6)?;
        Ok(Self {
            source: expr.to_string(),
            minute,
            hour,
            day_of_month,
            month,
            day_of_week,
            dom_restrictive: fields[2].trim() != "*",
            dow_restrictive: fields[4].trim() != "*",
        })
    }

    /// Does this expression match the given calendar minute?
    ///
    /// When both day-of-month and day-of-week are restrictive (neither is
    /// `*`), the standard disjunctive semantics apply: match if EITHER
    /// constraint is satisfied.
    pub fn matches(&self, at: &CalendarMinute) -> bool {
        if !self.minute.contains(at.minute) || !self.hour.contains(at.hour) || !self.month.contains(at.month) {
            return false;
        }
        let dom_ok = self.day_of_month.contains(at.day);
        let dow_ok = self.day_of_week.contains(at.weekday);
        if self.dom_restrictive && self.dow_restrictive {
            dom_ok || dow_ok
        } else {
            dom_ok && dow_ok
        }
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Serialize for CronExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for CronExpr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CronExpr::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A normalized schedule: zero or more CRON expressions, firing if ANY
/// matches. An empty schedule means "never" (used for permanent
/// deployments, i.e. `destroy_schedule: false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(pub Vec<CronExpr>);

impl Schedule {
    pub fn never() -> Self {
        Self(Vec::new())
    }

    pub fn single(expr: CronExpr) -> Self {
        Self(vec![expr])
    }

    pub fn is_never(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, at: &CalendarMinute) -> bool {
        self.0.iter().any(|e| e.matches(at))
    }

    /// Parse from the raw JSON shape: a CRON string, an array of CRON
    /// strings (fires if any matches), or the literal `false` ("never").
    /// The literal `true` is invalid.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CronError> {
        match value {
            serde_json::Value::Bool(false) => Ok(Schedule::never()),
            serde_json::Value::Bool(true) => Err(CronError::BareTrueNotAllowed),
            serde_json::Value::String(s) => Ok(Schedule::single(CronExpr::parse(s)?)),
            serde_json::Value::Array(items) => {
                let mut exprs = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(s) => exprs.push(CronExpr::parse(s)?),
                        _ => return Err(CronError::InvalidScheduleShape),
                    }
                }
                Ok(Schedule(exprs))
            }
            _ => Err(CronError::InvalidScheduleShape),
        }
    }
}

/// A local-calendar instant with minute granularity.
///
/// `weekday` is 0 = Sunday .. 6 = Saturday, matching the CRON day-of-week
/// convention used throughout this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMinute {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CalendarMinute {
    /// Same calendar day as `self`, at the given hour/minute.
    pub fn with_time(&self, hour: u32, minute: u32) -> Self {
        Self { hour, minute, ..*self }
    }

    fn is_same_day(&self, other: &CalendarMinute) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }

    /// Convert milliseconds since the Unix epoch into the local calendar
    /// minute, using the daemon host's local timezone.
    pub fn from_epoch_ms(epoch_ms: u64) -> Self {
        let secs = (epoch_ms / 1000) as i64;
        let nanos = ((epoch_ms % 1000) * 1_000_000) as u32;
        let dt = chrono::Local.timestamp_opt(secs, nanos).single().unwrap_or_else(|| {
            chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nanos).unwrap_or_default().with_timezone(&chrono::Local)
        });
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            weekday: dt.weekday().num_days_from_sunday(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }
}

/// Scan back from `at` to local midnight on the same day and return the
/// latest minute matching `schedule`, if any.
///
/// This is the window rule's "most recent firing today" computation: at
/// most 1440 iterations, independent of how long the schedule or the
/// daemon have been running.
pub fn last_fire_at_or_before(schedule: &Schedule, at: CalendarMinute) -> Option<CalendarMinute> {
    if schedule.is_never() {
        return None;
    }
    let total_minutes = at.hour * 60 + at.minute;
    for m in (0..=total_minutes).rev() {
        let candidate = at.with_time(m / 60, m % 60);
        if schedule.matches(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// The window-based trigger rule: "has a firing elapsed today that we have
/// not yet acted upon?"
///
/// `last_action` is the calendar minute of the most recent action already
/// taken for this schedule (e.g. `last_deployed`), or `None` if none has
/// ever occurred. Returns the fired minute when a trigger should fire.
///
/// Idempotent and catch-up-safe: calling this twice with the same `at` and
/// `last_action` yields the same answer, and a daemon restarted later the
/// same day still sees any unacted firing from earlier that day. Firings
/// from a prior calendar day are never retroactively triggered, since the
/// scan never leaves `at`'s calendar day.
pub fn window_fired(schedule: &Schedule, at: CalendarMinute, last_action: Option<CalendarMinute>) -> Option<CalendarMinute> {
    let fired = last_fire_at_or_before(schedule, at)?;
    match last_action {
        Some(last) if last.is_same_day(&fired) && last >= fired => None,
        Some(last) if !last.is_same_day(&fired) => Some(fired),
        Some(_) => Some(fired),
        None => Some(fired),
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;

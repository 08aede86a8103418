//! Episode publish-state determination
//!
//! One canonical implementation of the draft / scheduled / published rule,
//! shared by episode creation and the auto-publish sweep.

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Episode lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeStatus {
    Draft,
    Scheduled,
    Published,
}

impl EpisodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeStatus::Draft => "draft",
            EpisodeStatus::Scheduled => "scheduled",
            EpisodeStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(EpisodeStatus::Draft),
            "scheduled" => Ok(EpisodeStatus::Scheduled),
            "published" => Ok(EpisodeStatus::Published),
            other => Err(Error::InvalidInput(format!(
                "'{}' is not a valid status",
                other
            ))),
        }
    }
}

/// Result of evaluating a publish date/time pair against "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishState {
    pub status: EpisodeStatus,
    pub is_public: bool,
}

/// Parse a `YYYY-MM-DD` publish date
pub fn parse_publish_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::InvalidInput(format!(
            "Publish date must be in YYYY-MM-DD format (got '{}')",
            value
        ))
    })
}

/// Parse an `HH:MM` publish time
pub fn parse_publish_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| {
        Error::InvalidInput(format!(
            "Publish time must be in HH:MM format (got '{}')",
            value
        ))
    })
}

/// Determine status and visibility from an optional publish date/time.
///
/// Rules:
/// - No date supplied: draft, not public.
/// - Date+time supplied and <= now: published, public.
/// - Date+time supplied and > now: scheduled, not public.
///
/// A missing time defaults to 00:00. The boundary case (publish instant
/// exactly equal to `now`) is published.
pub fn determine_publish_state(
    publish_date: Option<&str>,
    publish_time: Option<&str>,
    now: NaiveDateTime,
) -> Result<PublishState> {
    let Some(date) = publish_date.filter(|d| !d.is_empty()) else {
        return Ok(PublishState {
            status: EpisodeStatus::Draft,
            is_public: false,
        });
    };

    let date = parse_publish_date(date)?;
    let time = match publish_time.filter(|t| !t.is_empty()) {
        Some(t) => parse_publish_time(t)?,
        None => NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
    };

    let publish_at = date.and_time(time);

    if publish_at <= now {
        Ok(PublishState {
            status: EpisodeStatus::Published,
            is_public: true,
        })
    } else {
        Ok(PublishState {
            status: EpisodeStatus::Scheduled,
            is_public: false,
        })
    }
}

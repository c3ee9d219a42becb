//! Event records for both sides of the sync.
//!
//! The two shapes are deliberately kept apart: a [`RemoteEvent`] mirrors what
//! the calendar provider returns, an [`Appointment`] mirrors one record of the
//! local appointment file. They only meet through their title, which is the
//! join key (see [`Keyed`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::Keyed;
use crate::error::{ApptSyncError, ApptSyncResult};
use crate::ticks::{parse_ticks, ticks_to_timestamp};

/// Marker embedded in the description of every event this tool inserts
/// remotely, so the reverse direction never imports it back.
pub const TOMBSTONE_MARKER: &str = "Synced from local XML";

/// Description carried by a remote event created from local appointment `local_id`.
pub fn tombstone_description(local_id: &str) -> String {
    format!("{} - ID {}", TOMBSTONE_MARKER, local_id)
}

// =============================================================================
// Remote-shaped events
// =============================================================================

/// Start or end of a remote event: a precise instant or a whole day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteEventTime {
    /// RFC 3339 instant, e.g. `2024-01-19T15:00:00+01:00`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day date, e.g. `2024-01-19`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl RemoteEventTime {
    pub fn instant(date_time: impl Into<String>) -> Self {
        RemoteEventTime {
            date_time: Some(date_time.into()),
            ..Default::default()
        }
    }

    pub fn all_day(date: impl Into<String>) -> Self {
        RemoteEventTime {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    /// The wire timestamp to use, preferring the precise instant.
    pub fn timestamp(&self) -> Option<&str> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|s| !s.trim().is_empty())
        }

        non_empty(&self.date_time).or_else(|| non_empty(&self.date))
    }
}

/// An event as listed by the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RemoteEventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<RemoteEventTime>,

    /// Provider fields we do not interpret, kept for snapshots.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RemoteEvent {
    pub fn start_timestamp(&self) -> Option<&str> {
        self.start.as_ref().and_then(RemoteEventTime::timestamp)
    }

    pub fn end_timestamp(&self) -> Option<&str> {
        self.end.as_ref().and_then(RemoteEventTime::timestamp)
    }

    /// Whether this event was inserted by us from a local appointment.
    pub fn is_tombstone(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.contains(TOMBSTONE_MARKER))
    }
}

impl Keyed for RemoteEvent {
    fn key(&self) -> &str {
        self.summary.trim()
    }
}

/// Body of an insert request against the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRemoteEvent {
    pub title: String,
    /// RFC 3339 instant
    pub start: String,
    /// RFC 3339 instant
    pub end: String,
    pub time_zone: String,
    pub description: String,
}

impl NewRemoteEvent {
    /// Build the insert body for a local appointment, tagged with the tombstone marker.
    pub fn from_appointment(appointment: &Appointment, time_zone: &str) -> ApptSyncResult<Self> {
        Ok(NewRemoteEvent {
            title: appointment.description.clone(),
            start: appointment.start_time()?.to_rfc3339(),
            end: appointment.end_time()?.to_rfc3339(),
            time_zone: time_zone.to_string(),
            description: tombstone_description(&appointment.id),
        })
    }
}

// =============================================================================
// File-shaped events
// =============================================================================

/// One record of the local appointment file.
///
/// Start and end keep the raw tick text so that rewriting the file never
/// alters values we did not touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub start_ticks: String,
    pub end_ticks: String,
    pub description: String,
    pub reminder: bool,
}

impl Appointment {
    pub fn new(id: u64, start_ticks: i64, end_ticks: i64, description: &str) -> Self {
        Appointment {
            id: id.to_string(),
            start_ticks: start_ticks.to_string(),
            end_ticks: end_ticks.to_string(),
            description: description.to_string(),
            reminder: false,
        }
    }

    pub fn start_time(&self) -> ApptSyncResult<DateTime<Utc>> {
        parse_ticks(&self.start_ticks)
    }

    pub fn end_time(&self) -> ApptSyncResult<DateTime<Utc>> {
        parse_ticks(&self.end_ticks)
    }

    /// The identifier as a number, if it is purely decimal.
    pub fn numeric_id(&self) -> Option<u64> {
        if self.id.is_empty() || !self.id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.id.parse().ok()
    }
}

impl Keyed for Appointment {
    fn key(&self) -> &str {
        self.description.trim()
    }
}

/// Next free appointment identifier: highest numeric id plus one, or 1.
///
/// Fails once the highest id is `u64::MAX`.
pub fn next_appointment_id(appointments: &[Appointment]) -> ApptSyncResult<u64> {
    match appointments.iter().filter_map(Appointment::numeric_id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            ApptSyncError::AppointmentWrite(format!("No appointment id left after {}", max))
        }),
    }
}

/// Render tick text for log lines, falling back to the raw value.
pub fn display_ticks(ticks: &str) -> String {
    ticks
        .trim()
        .parse::<i64>()
        .map(|t| ticks_to_timestamp(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| ticks.to_string())
}

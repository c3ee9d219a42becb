//! Time window a sync run looks at.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::event::{Appointment, RemoteEvent};
use crate::ticks::parse_timestamp;

/// Closed interval `[from, to]` around "now". Events starting outside it are
/// invisible to the sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl SyncWindow {
    pub fn around(now: DateTime<Utc>, past_days: u32, future_days: u32) -> Self {
        SyncWindow {
            from: now - Duration::days(i64::from(past_days)),
            to: now + Duration::days(i64::from(future_days)),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }

    /// Keep the appointments whose start falls inside the window.
    ///
    /// Appointments with unreadable start ticks are dropped with a warning.
    pub fn filter_appointments(&self, appointments: &[Appointment]) -> Vec<Appointment> {
        appointments
            .iter()
            .filter(|appointment| match appointment.start_time() {
                Ok(start) => self.contains(start),
                Err(e) => {
                    warn!(id = %appointment.id, error = %e, "Skipping appointment with unreadable start");
                    false
                }
            })
            .cloned()
            .collect()
    }

    /// Keep the remote events whose start falls inside the window.
    ///
    /// Events without a readable start are kept; the window cannot place them.
    pub fn filter_remote_events(&self, events: &[RemoteEvent]) -> Vec<RemoteEvent> {
        events
            .iter()
            .filter(|event| {
                event
                    .start_timestamp()
                    .and_then(|start| parse_timestamp(start).ok())
                    .is_none_or(|start| self.contains(start))
            })
            .cloned()
            .collect()
    }
}

impl fmt::Display for SyncWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.from.format("%Y-%m-%d %H:%M"),
            self.to.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RemoteEventTime;
    use crate::ticks::datetime_to_ticks;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn appointment(id: u64, start: DateTime<Utc>) -> Appointment {
        let ticks = datetime_to_ticks(start);
        Appointment::new(id, ticks, ticks, &format!("appointment {}", id))
    }

    #[test]
    fn test_window_around_now() {
        let now = at(2024, 1, 15, 12);
        let window = SyncWindow::around(now, 7, 30);
        assert_eq!(window.from, at(2024, 1, 8, 12));
        assert_eq!(window.to, at(2024, 2, 14, 12));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let window = SyncWindow::around(at(2024, 1, 15, 12), 7, 30);
        assert!(window.contains(window.from));
        assert!(window.contains(window.to));
        assert!(!window.contains(window.from - Duration::seconds(1)));
        assert!(!window.contains(window.to + Duration::seconds(1)));
    }

    #[test]
    fn test_filter_appointments() {
        let window = SyncWindow::around(at(2024, 1, 15, 12), 7, 30);
        let mut malformed = appointment(4, at(2024, 1, 16, 9));
        malformed.start_ticks = "soon".to_string();

        let appointments = vec![
            appointment(1, at(2024, 1, 16, 9)),
            appointment(2, at(2023, 12, 1, 9)),
            appointment(3, window.to),
            malformed,
        ];

        let ids: Vec<_> = window
            .filter_appointments(&appointments)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_filter_remote_events() {
        let window = SyncWindow::around(at(2024, 1, 15, 12), 7, 30);
        let remote = |id: &str, start: Option<DateTime<Utc>>| RemoteEvent {
            id: id.to_string(),
            summary: id.to_string(),
            description: None,
            start: start.map(|s| RemoteEventTime::instant(s.to_rfc3339())),
            end: None,
            extra: serde_json::Map::new(),
        };

        let events = vec![
            remote("inside", Some(at(2024, 1, 16, 9))),
            remote("aged-out", Some(at(2024, 1, 7, 9))),
            remote("far", Some(at(2024, 3, 1, 9))),
            remote("undated", None),
        ];

        let ids: Vec<_> = window
            .filter_remote_events(&events)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["inside", "undated"]);
    }
}

//! Conversion between Google API types and apptsync events.

use anyhow::{Context, Result};
use apptsync_core::{NewRemoteEvent, RemoteEvent, RemoteEventTime};
use chrono::{DateTime, Utc};
use google_calendar::types::{Event, EventDateTime};
use serde_json::{Map, Value};

/// Convert from Google API types to apptsync types
pub trait FromGoogle<T> {
    fn from_google(value: T) -> Self;
}

/// Convert to Google API types from apptsync types
pub trait ToGoogle<T> {
    fn to_google(&self) -> Result<T>;
}

impl FromGoogle<EventDateTime> for RemoteEventTime {
    fn from_google(time: EventDateTime) -> Self {
        RemoteEventTime {
            date_time: time.date_time.map(|dt| dt.to_rfc3339()),
            date: time.date.map(|d| d.to_string()),
            time_zone: non_empty(time.time_zone),
        }
    }
}

impl FromGoogle<Event> for RemoteEvent {
    fn from_google(event: Event) -> Self {
        let mut extra = Map::new();
        for (key, value) in [
            ("status", &event.status),
            ("location", &event.location),
            ("iCalUID", &event.i_cal_uid),
        ] {
            if !value.is_empty() {
                extra.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        RemoteEvent {
            id: event.id,
            summary: event.summary,
            description: non_empty(event.description),
            start: event.start.map(RemoteEventTime::from_google),
            end: event.end.map(RemoteEventTime::from_google),
            extra,
        }
    }
}

impl ToGoogle<Event> for NewRemoteEvent {
    fn to_google(&self) -> Result<Event> {
        Ok(Event {
            summary: self.title.clone(),
            description: self.description.clone(),
            start: Some(instant_to_google(&self.start, &self.time_zone)?),
            end: Some(instant_to_google(&self.end, &self.time_zone)?),
            ..Default::default()
        })
    }
}

fn instant_to_google(value: &str, time_zone: &str) -> Result<EventDateTime> {
    let date_time = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid event time '{}'", value))?
        .with_timezone(&Utc);

    Ok(EventDateTime {
        date: None,
        date_time: Some(date_time),
        time_zone: time_zone.to_string(),
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_timed_event_from_google() {
        let event = Event {
            id: "abc123".into(),
            summary: "Standup".into(),
            status: "confirmed".into(),
            start: Some(EventDateTime {
                date: None,
                date_time: Some(Utc.with_ymd_and_hms(2024, 1, 17, 9, 30, 0).unwrap()),
                time_zone: "Europe/Paris".into(),
            }),
            ..Default::default()
        };

        let remote = RemoteEvent::from_google(event);
        assert_eq!(remote.id, "abc123");
        assert_eq!(remote.summary, "Standup");
        assert_eq!(remote.description, None);
        assert_eq!(remote.start_timestamp(), Some("2024-01-17T09:30:00+00:00"));
        assert_eq!(remote.end, None);
        assert_eq!(remote.extra.get("status"), Some(&Value::String("confirmed".into())));
        assert!(!remote.extra.contains_key("location"));
    }

    #[test]
    fn test_all_day_event_from_google() {
        let event = Event {
            id: "holiday".into(),
            summary: "Holiday".into(),
            start: Some(EventDateTime {
                date: NaiveDate::from_ymd_opt(2024, 1, 20),
                date_time: None,
                time_zone: String::new(),
            }),
            ..Default::default()
        };

        let remote = RemoteEvent::from_google(event);
        let start = remote.start.unwrap();
        assert_eq!(start.date.as_deref(), Some("2024-01-20"));
        assert_eq!(start.time_zone, None);
    }

    #[test]
    fn test_new_event_to_google() {
        let new_event = NewRemoteEvent {
            title: "Dentist".into(),
            start: "2022-01-13T10:00:00+00:00".into(),
            end: "2022-01-13T11:00:00+00:00".into(),
            time_zone: "Europe/Paris".into(),
            description: "Synced from local XML - ID 1".into(),
        };

        let event = new_event.to_google().unwrap();
        assert_eq!(event.summary, "Dentist");
        assert_eq!(event.description, "Synced from local XML - ID 1");
        assert!(event.id.is_empty());

        let start = event.start.unwrap();
        assert_eq!(start.date_time, Some(Utc.with_ymd_and_hms(2022, 1, 13, 10, 0, 0).unwrap()));
        assert_eq!(start.time_zone, "Europe/Paris");
    }

    #[test]
    fn test_new_event_with_bad_time_is_rejected() {
        let new_event = NewRemoteEvent {
            title: "Broken".into(),
            start: "tomorrow".into(),
            end: "2022-01-13T11:00:00+00:00".into(),
            time_zone: "Europe/Paris".into(),
            description: String::new(),
        };
        assert!(new_event.to_google().is_err());
    }
}

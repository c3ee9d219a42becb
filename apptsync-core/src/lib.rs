//! Core of apptsync: keeps a remote calendar and a local appointment file
//! consistent by diffing each against a snapshot of the previous run.
//!
//! - [`sync::Reconciler`] runs one reconciliation pass
//! - [`remote::RemoteCalendar`] is the seam to the calendar service
//! - [`appointments::AppointmentFile`] reads and writes the local file

pub mod appointments;
pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod remote;
pub mod snapshot;
pub mod sync;
pub mod sync_window;
pub mod ticks;

pub use error::{ApptSyncError, ApptSyncResult};
pub use event::{Appointment, NewRemoteEvent, RemoteEvent, RemoteEventTime};

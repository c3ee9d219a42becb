//! Bidirectional reconciliation between the remote calendar and the local
//! appointment file.
//!
//! One run goes through fixed steps:
//!
//! 1. List remote events in the window and read the appointment file.
//! 2. Diff each side against its snapshot from the previous run.
//! 3. Push local additions, then pull remote additions, then push local
//!    deletions, then pull remote deletions.
//! 4. Re-read both sides and store them as the new snapshots.
//!
//! A failure on a single event is recorded in the [`SyncReport`] and the
//! run continues. Failing to list, read or write a whole side aborts the
//! run before the snapshots are saved, so the next run sees the same diff.

mod plan;
mod report;


use std::collections::HashSet;
use std::io;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::appointments::AppointmentFile;
use crate::config::SyncConfig;
use crate::diff::{Keyed, detect_changes};
use crate::error::{ApptSyncError, ApptSyncResult};
use crate::event::{Appointment, NewRemoteEvent, RemoteEvent, display_ticks, next_appointment_id};
use crate::remote::RemoteCalendar;
use crate::snapshot::{SnapshotStore, Snapshots};
use crate::sync_window::SyncWindow;
use crate::ticks::timestamp_to_ticks;

pub use plan::SyncPlan;
pub use report::{BatchOutcome, EventFailure, SyncReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Propagate additions and deletions since the last snapshots.
    #[default]
    Full,
    /// Treat everything as new and never delete anything.
    AdditionsOnly,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub past_days: u32,
    pub future_days: u32,
    /// Zone attached to events inserted remotely.
    pub time_zone: String,
    pub mode: SyncMode,
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        SyncOptions {
            past_days: config.past_days,
            future_days: config.future_days,
            time_zone: config.time_zone.clone(),
            mode: SyncMode::Full,
        }
    }
}

pub struct Reconciler<R> {
    remote: R,
    appointments: AppointmentFile,
    snapshots: SnapshotStore,
    options: SyncOptions,
}

impl<R: RemoteCalendar> Reconciler<R> {
    pub fn new(
        remote: R,
        appointments: AppointmentFile,
        snapshots: SnapshotStore,
        options: SyncOptions,
    ) -> Self {
        Reconciler {
            remote,
            appointments,
            snapshots,
            options,
        }
    }

    pub fn from_config(remote: R, config: &SyncConfig) -> ApptSyncResult<Self> {
        Ok(Reconciler::new(
            remote,
            config.appointment_file(),
            config.snapshot_store()?,
            SyncOptions::from_config(config),
        ))
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn appointment_file(&self) -> &AppointmentFile {
        &self.appointments
    }

    pub fn snapshot_store(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub async fn plan(&self) -> ApptSyncResult<SyncPlan> {
        self.plan_at(Utc::now()).await
    }

    /// Fetch both sides and diff them against the snapshots, changing nothing.
    pub async fn plan_at(&self, now: DateTime<Utc>) -> ApptSyncResult<SyncPlan> {
        let window = SyncWindow::around(now, self.options.past_days, self.options.future_days);
        debug!("Fetching events from {}", window);

        let previous = match self.options.mode {
            SyncMode::Full => self.snapshots.load(),
            SyncMode::AdditionsOnly => Snapshots::default(),
        };

        let remote_events = self.remote.list_events(&window).await?;
        let local_events = self.read_local(previous.local.is_empty())?;
        let local_in_window = window.filter_appointments(&local_events);

        // Snapshot entries that aged out of the window are not deletions
        let previous_remote = window.filter_remote_events(&previous.remote);
        let previous_local = window.filter_appointments(&previous.local);
        let remote_in_window = window.filter_remote_events(&remote_events);

        let mut remote_changes = detect_changes(&remote_in_window, &previous_remote);
        let mut local_changes = detect_changes(&local_in_window, &previous_local);
        if self.options.mode == SyncMode::AdditionsOnly {
            remote_changes = remote_changes.additions_only();
            local_changes = local_changes.additions_only();
        }

        debug!(
            remote_added = remote_changes.added.len(),
            remote_deleted = remote_changes.deleted.len(),
            local_added = local_changes.added.len(),
            local_deleted = local_changes.deleted.len(),
            "Detected changes"
        );

        Ok(SyncPlan {
            window,
            remote_events,
            local_events,
            remote_changes,
            local_changes,
        })
    }

    pub async fn run(&self) -> ApptSyncResult<SyncReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one full pass using `now` as the centre of the window.
    pub async fn run_at(&self, now: DateTime<Utc>) -> ApptSyncResult<SyncReport> {
        let plan = self.plan_at(now).await?;
        let mut local_events = plan.local_events.clone();

        let report = SyncReport {
            pushed: self.push_additions(&plan).await,
            pulled: self.pull_additions(&plan, &mut local_events)?,
            push_deleted: self.push_deletions(&plan).await,
            pull_deleted: self.pull_deletions(&plan, &mut local_events)?,
        };

        self.save_snapshots(&plan).await?;
        Ok(report)
    }

    /// Insert local additions remotely, unless a remote event already has the title.
    async fn push_additions(&self, plan: &SyncPlan) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let remote_titles: HashSet<&str> = plan.remote_events.iter().map(Keyed::key).collect();

        for appointment in &plan.local_changes.added {
            let title = appointment.key();

            if remote_titles.contains(title) {
                debug!(title, "Already on remote calendar");
                outcome.skipped += 1;
                continue;
            }

            let new_event = match NewRemoteEvent::from_appointment(appointment, &self.options.time_zone) {
                Ok(event) => event,
                Err(e) => {
                    warn!(title, error = %e, "Cannot convert appointment");
                    outcome.record_failure(title, e);
                    continue;
                }
            };

            match self.remote.insert_event(&new_event).await {
                Ok(created) => {
                    info!(title, id = %created.id, start = %display_ticks(&appointment.start_ticks), "Added to remote calendar");
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    error!(title, error = %e, "Failed to add to remote calendar");
                    outcome.record_failure(title, e);
                }
            }
        }

        outcome
    }

    /// Append remote additions to the appointment file, skipping our own
    /// inserts and titles the file already has.
    fn pull_additions(
        &self,
        plan: &SyncPlan,
        local_events: &mut Vec<Appointment>,
    ) -> ApptSyncResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let mut local_titles: HashSet<String> =
            local_events.iter().map(|a| a.key().to_string()).collect();
        let mut next_id = next_appointment_id(local_events);
        let mut staged = Vec::new();

        for event in &plan.remote_changes.added {
            let title = event.key();

            if event.is_tombstone() {
                debug!(title, "Skipping event inserted from the appointment file");
                outcome.skipped += 1;
                continue;
            }
            if local_titles.contains(title) {
                debug!(title, "Already in appointment file");
                outcome.skipped += 1;
                continue;
            }

            let (Some(start), Some(end)) = (event.start_timestamp(), event.end_timestamp()) else {
                warn!(title, "Skipping remote event without start or end time");
                outcome.skipped += 1;
                continue;
            };

            let ticks = timestamp_to_ticks(start).and_then(|s| timestamp_to_ticks(end).map(|e| (s, e)));
            match ticks {
                Ok((start_ticks, end_ticks)) => {
                    let id = match &next_id {
                        Ok(id) => *id,
                        Err(e) => {
                            warn!(title, error = %e, "Cannot allocate an appointment id");
                            outcome.record_failure(title, e);
                            continue;
                        }
                    };
                    let appointment = Appointment::new(id, start_ticks, end_ticks, title);
                    info!(title, id = %appointment.id, start, "Added to appointment file");
                    next_id = next_appointment_id(std::slice::from_ref(&appointment));
                    local_titles.insert(title.to_string());
                    staged.push(appointment);
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    warn!(title, error = %e, "Cannot convert remote event");
                    outcome.record_failure(title, e);
                }
            }
        }

        if !staged.is_empty() {
            local_events.extend(staged);
            self.appointments.write(local_events)?;
        }

        Ok(outcome)
    }

    /// Delete remotely whatever disappeared locally, found by title search.
    async fn push_deletions(&self, plan: &SyncPlan) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for appointment in &plan.local_changes.deleted {
            let title = appointment.key();

            if title.is_empty() {
                warn!(id = %appointment.id, "Cannot delete an untitled appointment remotely");
                outcome.record_failure(title, "empty title");
                continue;
            }

            match self.delete_remote_by_title(title).await {
                Ok(Some(id)) => {
                    info!(title, id = %id, "Deleted from remote calendar");
                    outcome.succeeded += 1;
                }
                Ok(None) => {
                    warn!(title, "No matching remote event to delete");
                    outcome.record_failure(title, "not found on remote calendar");
                }
                Err(e) => {
                    error!(title, error = %e, "Failed to delete from remote calendar");
                    outcome.record_failure(title, e);
                }
            }
        }

        outcome
    }

    /// Delete the first search hit whose title matches exactly.
    async fn delete_remote_by_title(&self, title: &str) -> ApptSyncResult<Option<String>> {
        let candidates = self.remote.find_by_text(title).await?;
        let Some(target) = candidates.iter().find(|e| e.key() == title) else {
            return Ok(None);
        };

        self.remote.delete_event(&target.id).await?;
        Ok(Some(target.id.clone()))
    }

    /// Remove from the appointment file every appointment whose title
    /// disappeared remotely.
    fn pull_deletions(
        &self,
        plan: &SyncPlan,
        local_events: &mut Vec<Appointment>,
    ) -> ApptSyncResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let titles: HashSet<&str> = plan
            .remote_changes
            .deleted
            .iter()
            .map(Keyed::key)
            .filter(|t| !t.is_empty())
            .collect();

        if titles.is_empty() {
            return Ok(outcome);
        }

        let before = local_events.len();
        local_events.retain(|appointment| {
            let gone = titles.contains(appointment.key());
            if gone {
                info!(title = appointment.key(), id = %appointment.id, "Removed from appointment file");
            }
            !gone
        });
        outcome.succeeded = before - local_events.len();

        if outcome.succeeded > 0 {
            self.appointments.write(local_events)?;
        } else {
            debug!("No matching appointments to remove");
        }

        Ok(outcome)
    }

    /// Read the appointment file. A missing file only reads as empty when
    /// `missing_is_empty` is set, so a vanished file never turns into a
    /// wave of deletions.
    fn read_local(&self, missing_is_empty: bool) -> ApptSyncResult<Vec<Appointment>> {
        match self.appointments.read() {
            Err(ApptSyncError::Io(e)) if missing_is_empty && e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.appointments.path().display(), "Appointment file missing, treating as empty");
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// Re-read both sides after all writes and store them for the next run.
    async fn save_snapshots(&self, plan: &SyncPlan) -> ApptSyncResult<()> {
        let window = &plan.window;
        let remote_events: Vec<RemoteEvent> = self.remote.list_events(window).await?;
        let local_events = self.read_local(plan.local_events.is_empty())?;
        let local_in_window = window.filter_appointments(&local_events);

        self.snapshots.save(&remote_events, &local_in_window)
    }
}

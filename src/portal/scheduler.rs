use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use super::domain::{Drive, DriveDraft, DriveId};
use super::store::{StoreError, VaccinationStore};

/// Minimum number of days between "today" and a drive's date, giving
/// logistics staff time to prepare venues and doses.
pub const MIN_LEAD_DAYS: i64 = 15;

/// Enforces the scheduling invariants when creating or updating drives:
/// the advance-notice window, one drive per calendar date, and the
/// immutability of drives whose date has passed.
pub struct DriveScheduler<S> {
    store: Arc<S>,
}

impl<S> DriveScheduler<S>
where
    S: VaccinationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Schedule a new drive. The calendar-exclusivity rule is enforced by
    /// the store's uniqueness constraint, so two racing calls for the same
    /// date cannot both succeed.
    pub fn schedule(&self, draft: DriveDraft, today: NaiveDate) -> Result<Drive, ScheduleError> {
        validate(&draft)?;
        check_lead_time(draft.drive_date, today)?;

        match self.store.insert_drive(draft) {
            Ok(drive) => Ok(drive),
            Err(StoreError::Conflict) => Err(ScheduleError::DateTaken),
            Err(other) => Err(ScheduleError::Store(other)),
        }
    }

    /// Overwrite a drive's vaccine name, date, doses, and applicable
    /// classes. Drives whose stored date has already passed are immutable.
    pub fn update(
        &self,
        id: DriveId,
        draft: DriveDraft,
        today: NaiveDate,
    ) -> Result<Drive, ScheduleError> {
        let existing = self
            .store
            .fetch_drive(id)?
            .ok_or(ScheduleError::NotFound)?;
        if existing.drive_date < today {
            return Err(ScheduleError::PastDrive);
        }

        validate(&draft)?;
        check_lead_time(draft.drive_date, today)?;

        match self.store.update_drive(draft.into_drive(id)) {
            Ok(drive) => Ok(drive),
            Err(StoreError::Conflict) => Err(ScheduleError::DateTaken),
            Err(StoreError::NotFound) => Err(ScheduleError::NotFound),
            Err(other) => Err(ScheduleError::Store(other)),
        }
    }

    /// Every drive on record, ascending by date.
    pub fn all_drives(&self) -> Result<Vec<Drive>, ScheduleError> {
        Ok(self.store.list_drives()?)
    }

    /// Drives dated today or later, ascending; bounded to
    /// `today + window_days` inclusive when a window is given.
    pub fn upcoming(
        &self,
        today: NaiveDate,
        window_days: Option<i64>,
    ) -> Result<Vec<Drive>, ScheduleError> {
        let until = window_days.map(|days| today + Duration::days(days));
        Ok(self.store.drives_between(today, until)?)
    }
}

fn validate(draft: &DriveDraft) -> Result<(), ScheduleError> {
    if draft.vaccine_name.trim().is_empty() {
        return Err(ScheduleError::Validation);
    }
    Ok(())
}

fn check_lead_time(date: NaiveDate, today: NaiveDate) -> Result<(), ScheduleError> {
    if (date - today).num_days() < MIN_LEAD_DAYS {
        return Err(ScheduleError::LeadTime);
    }
    Ok(())
}

/// Error raised by the drive scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("vaccine name is required")]
    Validation,
    #[error("drives must be scheduled at least 15 days in advance")]
    LeadTime,
    #[error("a drive is already scheduled on this date")]
    DateTaken,
    #[error("cannot edit a drive that has already taken place")]
    PastDrive,
    #[error("drive not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

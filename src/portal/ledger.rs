use std::sync::Arc;

use super::domain::{DriveId, StudentId};
use super::store::{StoreError, VaccinationStore};

/// Maintains the student-drive vaccination relation and the derived
/// `vaccinated` flag. A student moves from unvaccinated to vaccinated on
/// the first successful entry and stays vaccinated from then on; further
/// entries are constrained by the duplicate rules below.
pub struct VaccinationLedger<S> {
    store: Arc<S>,
}

impl<S> VaccinationLedger<S>
where
    S: VaccinationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record that a student was vaccinated in a drive. A student may not
    /// appear twice in the same drive, nor receive the same vaccine across
    /// different drives. The relation row and the flag are written in one
    /// store transaction.
    pub fn vaccinate(&self, student_id: StudentId, drive_id: DriveId) -> Result<(), LedgerError> {
        let student = self
            .store
            .fetch_student(student_id)?
            .ok_or(LedgerError::NotFound)?;
        let drive = self
            .store
            .fetch_drive(drive_id)?
            .ok_or(LedgerError::NotFound)?;

        let history = self.store.drives_for_student(student.id)?;
        if history.iter().any(|past| past.id == drive.id) {
            return Err(LedgerError::AlreadyVaccinatedForDrive);
        }
        if history
            .iter()
            .any(|past| past.vaccine_name == drive.vaccine_name)
        {
            return Err(LedgerError::DuplicateVaccine);
        }

        match self.store.record_vaccination(student.id, drive.id) {
            Ok(()) => Ok(()),
            Err(StoreError::Conflict) => Err(LedgerError::AlreadyVaccinatedForDrive),
            Err(StoreError::NotFound) => Err(LedgerError::NotFound),
            Err(other) => Err(LedgerError::Store(other)),
        }
    }

    /// Remove a student along with all their relation rows atomically.
    pub fn delete_student(&self, student_id: StudentId) -> Result<(), LedgerError> {
        match self.store.remove_student(student_id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(LedgerError::NotFound),
            Err(other) => Err(LedgerError::Store(other)),
        }
    }
}

/// Error raised by the vaccination ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("student or drive not found")]
    NotFound,
    #[error("student already vaccinated for this drive")]
    AlreadyVaccinatedForDrive,
    #[error("student already vaccinated with this vaccine")]
    DuplicateVaccine,
    #[error(transparent)]
    Store(#[from] StoreError),
}

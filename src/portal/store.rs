use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::{Drive, DriveDraft, DriveId, Student, StudentDraft, StudentId};

/// Query predicate for the student table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    /// Exact-match on the surrogate id.
    pub id: Option<StudentId>,
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
}

/// Persistence seam for students, drives, and the vaccination relation, so
/// the rule services can be exercised in isolation.
///
/// No business validation lives behind this trait; it only upholds the
/// relational constraints that must not be left to check-then-insert races:
/// one drive per calendar date, and at most one row per (student, drive)
/// pair. `record_vaccination` writes the relation row and the student's
/// `vaccinated` flag in a single transaction, and `remove_student` cascades
/// over the relation rows the same way.
pub trait VaccinationStore: Send + Sync {
    fn insert_student(&self, draft: StudentDraft) -> Result<Student, StoreError>;
    fn fetch_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;
    /// Matching students ordered by id.
    fn search_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, StoreError>;
    fn remove_student(&self, id: StudentId) -> Result<(), StoreError>;

    /// Fails with [`StoreError::Conflict`] when a drive already occupies the date.
    fn insert_drive(&self, draft: DriveDraft) -> Result<Drive, StoreError>;
    fn fetch_drive(&self, id: DriveId) -> Result<Option<Drive>, StoreError>;
    /// Overwrites the stored row; fails with [`StoreError::Conflict`] when a
    /// different drive occupies the new date.
    fn update_drive(&self, drive: Drive) -> Result<Drive, StoreError>;
    /// All drives ascending by date.
    fn list_drives(&self) -> Result<Vec<Drive>, StoreError>;
    /// Drives with `from <= drive_date` (and `drive_date <= until` when
    /// bounded), ascending by date.
    fn drives_between(
        &self,
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> Result<Vec<Drive>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the pair is already recorded.
    fn record_vaccination(&self, student: StudentId, drive: DriveId) -> Result<(), StoreError>;
    fn drives_for_student(&self, id: StudentId) -> Result<Vec<Drive>, StoreError>;
    /// The full student-drive join, ordered by (student id, drive id).
    fn vaccination_rows(&self) -> Result<Vec<(Student, Drive)>, StoreError>;
}

/// Error enumeration for store failures. `Unavailable` is the generic
/// internal-failure channel, kept distinct from the business-rule taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row conflicts with an existing record")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

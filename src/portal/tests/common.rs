use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::portal::domain::{Drive, DriveDraft, DriveId, Student, StudentDraft, StudentId};
use crate::portal::ledger::VaccinationLedger;
use crate::portal::memory::MemoryStore;
use crate::portal::reports::ReportService;
use crate::portal::roster::RosterService;
use crate::portal::scheduler::DriveScheduler;
use crate::portal::store::{StoreError, StudentFilter, VaccinationStore};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

pub(super) fn in_days(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub(super) struct Portal {
    pub(super) store: Arc<MemoryStore>,
    pub(super) scheduler: DriveScheduler<MemoryStore>,
    pub(super) ledger: VaccinationLedger<MemoryStore>,
    pub(super) roster: RosterService<MemoryStore>,
    pub(super) reports: ReportService<MemoryStore>,
}

pub(super) fn portal() -> Portal {
    let store = Arc::new(MemoryStore::default());
    Portal {
        scheduler: DriveScheduler::new(store.clone()),
        ledger: VaccinationLedger::new(store.clone()),
        roster: RosterService::new(store.clone()),
        reports: ReportService::new(store.clone()),
        store,
    }
}

pub(super) fn drive_draft(vaccine: &str, date: NaiveDate) -> DriveDraft {
    DriveDraft {
        vaccine_name: vaccine.to_string(),
        drive_date: date,
        doses_available: 100,
        applicable_classes: "Grades 5-7".to_string(),
    }
}

pub(super) fn student_draft(name: &str, class: &str) -> StudentDraft {
    StudentDraft {
        name: name.to_string(),
        student_class: class.to_string(),
    }
}

/// Register a student and schedule a drive in one step for ledger tests.
pub(super) fn seeded_pair(portal: &Portal, vaccine: &str, days_out: i64) -> (Student, Drive) {
    let student = portal
        .roster
        .register(student_draft("Asha Rao", "5A"))
        .expect("student registers");
    let drive = portal
        .scheduler
        .schedule(drive_draft(vaccine, in_days(days_out)), today())
        .expect("drive schedules");
    (student, drive)
}

/// Store stub whose every call fails, for internal-error mapping tests.
pub(super) struct UnavailableStore;

impl UnavailableStore {
    fn fail<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl VaccinationStore for UnavailableStore {
    fn insert_student(&self, _draft: StudentDraft) -> Result<Student, StoreError> {
        Self::fail()
    }

    fn fetch_student(&self, _id: StudentId) -> Result<Option<Student>, StoreError> {
        Self::fail()
    }

    fn search_students(&self, _filter: &StudentFilter) -> Result<Vec<Student>, StoreError> {
        Self::fail()
    }

    fn remove_student(&self, _id: StudentId) -> Result<(), StoreError> {
        Self::fail()
    }

    fn insert_drive(&self, _draft: DriveDraft) -> Result<Drive, StoreError> {
        Self::fail()
    }

    fn fetch_drive(&self, _id: DriveId) -> Result<Option<Drive>, StoreError> {
        Self::fail()
    }

    fn update_drive(&self, _drive: Drive) -> Result<Drive, StoreError> {
        Self::fail()
    }

    fn list_drives(&self) -> Result<Vec<Drive>, StoreError> {
        Self::fail()
    }

    fn drives_between(
        &self,
        _from: NaiveDate,
        _until: Option<NaiveDate>,
    ) -> Result<Vec<Drive>, StoreError> {
        Self::fail()
    }

    fn record_vaccination(&self, _student: StudentId, _drive: DriveId) -> Result<(), StoreError> {
        Self::fail()
    }

    fn drives_for_student(&self, _id: StudentId) -> Result<Vec<Drive>, StoreError> {
        Self::fail()
    }

    fn vaccination_rows(&self) -> Result<Vec<(Student, Drive)>, StoreError> {
        Self::fail()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

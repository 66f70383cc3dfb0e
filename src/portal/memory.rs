use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::{Drive, DriveDraft, DriveId, Student, StudentDraft, StudentId};
use super::store::{StoreError, StudentFilter, VaccinationStore};

/// In-memory relational store backing the serve and demo commands and the
/// test suite. One mutex guards all three tables, so every trait call is a
/// single atomic transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<StudentId, Student>,
    drives: BTreeMap<DriveId, Drive>,
    vaccinations: Vec<(StudentId, DriveId)>,
    student_sequence: u64,
    drive_sequence: u64,
}

impl MemoryStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl Tables {
    fn sorted_by_date(drives: Vec<Drive>) -> Vec<Drive> {
        let mut drives = drives;
        drives.sort_by_key(|drive| (drive.drive_date, drive.id));
        drives
    }

    fn date_taken(&self, date: NaiveDate, exclude: Option<DriveId>) -> bool {
        self.drives
            .values()
            .any(|drive| drive.drive_date == date && Some(drive.id) != exclude)
    }
}

impl VaccinationStore for MemoryStore {
    fn insert_student(&self, draft: StudentDraft) -> Result<Student, StoreError> {
        let mut tables = self.tables()?;
        tables.student_sequence += 1;
        let student = Student {
            id: StudentId(tables.student_sequence),
            name: draft.name,
            student_class: draft.student_class,
            vaccinated: false,
        };
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    fn fetch_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.students.get(&id).cloned())
    }

    fn search_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, StoreError> {
        let tables = self.tables()?;
        let needle = filter.name.as_deref().map(str::to_lowercase);
        Ok(tables
            .students
            .values()
            .filter(|student| filter.id.map_or(true, |id| student.id == id))
            .filter(|student| {
                needle
                    .as_deref()
                    .map_or(true, |name| student.name.to_lowercase().contains(name))
            })
            .cloned()
            .collect())
    }

    fn remove_student(&self, id: StudentId) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.students.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.vaccinations.retain(|(student, _)| *student != id);
        Ok(())
    }

    fn insert_drive(&self, draft: DriveDraft) -> Result<Drive, StoreError> {
        let mut tables = self.tables()?;
        if tables.date_taken(draft.drive_date, None) {
            return Err(StoreError::Conflict);
        }
        tables.drive_sequence += 1;
        let drive = draft.into_drive(DriveId(tables.drive_sequence));
        tables.drives.insert(drive.id, drive.clone());
        Ok(drive)
    }

    fn fetch_drive(&self, id: DriveId) -> Result<Option<Drive>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.drives.get(&id).cloned())
    }

    fn update_drive(&self, drive: Drive) -> Result<Drive, StoreError> {
        let mut tables = self.tables()?;
        if !tables.drives.contains_key(&drive.id) {
            return Err(StoreError::NotFound);
        }
        if tables.date_taken(drive.drive_date, Some(drive.id)) {
            return Err(StoreError::Conflict);
        }
        tables.drives.insert(drive.id, drive.clone());
        Ok(drive)
    }

    fn list_drives(&self) -> Result<Vec<Drive>, StoreError> {
        let tables = self.tables()?;
        Ok(Tables::sorted_by_date(
            tables.drives.values().cloned().collect(),
        ))
    }

    fn drives_between(
        &self,
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> Result<Vec<Drive>, StoreError> {
        let tables = self.tables()?;
        Ok(Tables::sorted_by_date(
            tables
                .drives
                .values()
                .filter(|drive| drive.drive_date >= from)
                .filter(|drive| until.map_or(true, |until| drive.drive_date <= until))
                .cloned()
                .collect(),
        ))
    }

    fn record_vaccination(&self, student: StudentId, drive: DriveId) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if !tables.drives.contains_key(&drive) {
            return Err(StoreError::NotFound);
        }
        if tables.vaccinations.contains(&(student, drive)) {
            return Err(StoreError::Conflict);
        }
        let record = tables.students.get_mut(&student).ok_or(StoreError::NotFound)?;
        record.vaccinated = true;
        tables.vaccinations.push((student, drive));
        Ok(())
    }

    fn drives_for_student(&self, id: StudentId) -> Result<Vec<Drive>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .vaccinations
            .iter()
            .filter(|(student, _)| *student == id)
            .filter_map(|(_, drive)| tables.drives.get(drive).cloned())
            .collect())
    }

    fn vaccination_rows(&self) -> Result<Vec<(Student, Drive)>, StoreError> {
        let tables = self.tables()?;
        let mut pairs = tables.vaccinations.clone();
        pairs.sort();
        Ok(pairs
            .into_iter()
            .filter_map(|(student, drive)| {
                let student = tables.students.get(&student)?.clone();
                let drive = tables.drives.get(&drive)?.clone();
                Some((student, drive))
            })
            .collect())
    }
}

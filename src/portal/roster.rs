use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use super::domain::{Student, StudentDraft, StudentView};
use super::store::{StoreError, StudentFilter, VaccinationStore};

/// Student registration and listing.
pub struct RosterService<S> {
    store: Arc<S>,
}

impl<S> RosterService<S>
where
    S: VaccinationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a single student; name and class are both required.
    pub fn register(&self, draft: StudentDraft) -> Result<Student, RosterError> {
        if draft.name.trim().is_empty() || draft.student_class.trim().is_empty() {
            return Err(RosterError::Validation);
        }
        Ok(self.store.insert_student(draft)?)
    }

    /// Register students from CSV input with `name` and `student_class`
    /// columns. Rows with missing or empty fields, and rows the CSV reader
    /// cannot parse, are skipped; the batch continues and the count of
    /// students actually added is returned.
    pub fn bulk_register<R: Read>(&self, input: R) -> Result<usize, RosterError> {
        let mut reader = csv::Reader::from_reader(input);
        let headers = reader.headers()?.clone();
        let name_column = headers.iter().position(|header| header == "name");
        let class_column = headers.iter().position(|header| header == "student_class");
        let (Some(name_column), Some(class_column)) = (name_column, class_column) else {
            return Err(RosterError::MissingColumns);
        };

        let mut added = 0;
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    debug!(%err, "skipping unreadable roster row");
                    continue;
                }
            };
            let draft = StudentDraft {
                name: record.get(name_column).unwrap_or("").trim().to_string(),
                student_class: record.get(class_column).unwrap_or("").trim().to_string(),
            };
            match self.register(draft) {
                Ok(_) => added += 1,
                Err(RosterError::Validation) => {
                    debug!("skipping roster row with missing name or class");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(added)
    }

    /// Students matching the filter, each vaccinated student enriched with
    /// the detail of their most recent drive.
    pub fn list(&self, filter: &StudentFilter) -> Result<Vec<StudentView>, RosterError> {
        let students = self.store.search_students(filter)?;
        let mut views = Vec::with_capacity(students.len());
        for student in students {
            let drives = self.store.drives_for_student(student.id)?;
            views.push(StudentView::from_parts(student, &drives));
        }
        Ok(views)
    }
}

/// Error raised by the roster service.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("name and class are required")]
    Validation,
    #[error("csv must contain name and student_class columns")]
    MissingColumns,
    #[error("invalid csv input: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

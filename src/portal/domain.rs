use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate identifier for a registered student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub u64);

/// Surrogate identifier for a vaccination drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriveId(pub u64);

/// A registered student. The drives a student was vaccinated in live in the
/// store's relation table, never as owned references on the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub student_class: String,
    pub vaccinated: bool,
}

/// Registration input for a single student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub name: String,
    pub student_class: String,
}

/// A scheduled vaccination event on a specific date, for one vaccine, with a
/// dose capacity and a description of the eligible classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub id: DriveId,
    pub vaccine_name: String,
    pub drive_date: NaiveDate,
    pub doses_available: u32,
    pub applicable_classes: String,
}

/// Input for scheduling or updating a drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveDraft {
    pub vaccine_name: String,
    pub drive_date: NaiveDate,
    pub doses_available: u32,
    pub applicable_classes: String,
}

impl DriveDraft {
    pub(crate) fn into_drive(self, id: DriveId) -> Drive {
        Drive {
            id,
            vaccine_name: self.vaccine_name,
            drive_date: self.drive_date,
            doses_available: self.doses_available,
            applicable_classes: self.applicable_classes,
        }
    }
}

/// Vaccine and date of the most recent drive a student was vaccinated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationDetail {
    pub vaccine_name: String,
    pub drive_date: NaiveDate,
}

/// Student enriched with their latest vaccination detail for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentView {
    pub id: StudentId,
    pub name: String,
    pub student_class: String,
    pub vaccinated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccination_details: Option<VaccinationDetail>,
}

impl StudentView {
    /// Build the listing view; `drives` are the drives the student was
    /// vaccinated in, in any order.
    pub fn from_parts(student: Student, drives: &[Drive]) -> Self {
        let vaccination_details = drives
            .iter()
            .max_by_key(|drive| drive.drive_date)
            .map(|latest| VaccinationDetail {
                vaccine_name: latest.vaccine_name.clone(),
                drive_date: latest.drive_date,
            });

        StudentView {
            id: student.id,
            name: student.name,
            student_class: student.student_class,
            vaccinated: student.vaccinated,
            vaccination_details,
        }
    }
}

/// One line of the vaccination report: a student joined with a drive that
/// vaccinated them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub student_name: String,
    pub class: String,
    pub vaccine_name: String,
    pub vaccination_date: NaiveDate,
}

/// Aggregate counters plus the upcoming-drive window for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_students: usize,
    pub vaccinated_students: usize,
    pub vaccinated_percentage: f64,
    pub upcoming_drives: Vec<Drive>,
}

use std::io;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use super::domain::{DashboardMetrics, ReportRow};
use super::store::{StoreError, StudentFilter, VaccinationStore};

/// Width of the upcoming-drive window shown on the dashboard and the
/// `/drives/upcoming` listing.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

const EXPORT_HEADER: [&str; 4] = ["Student Name", "Class", "Vaccine Name", "Vaccination Date"];

/// Read-only derived views over the store and ledger state.
pub struct ReportService<S> {
    store: Arc<S>,
}

impl<S> ReportService<S>
where
    S: VaccinationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Totals, coverage percentage (two decimals), and the drives coming up
    /// in the next [`UPCOMING_WINDOW_DAYS`] days.
    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardMetrics, StoreError> {
        let students = self.store.search_students(&StudentFilter::default())?;
        let total_students = students.len();
        let vaccinated_students = students.iter().filter(|student| student.vaccinated).count();
        let vaccinated_percentage = if total_students == 0 {
            0.0
        } else {
            round_two(vaccinated_students as f64 / total_students as f64 * 100.0)
        };

        let upcoming_drives = self
            .store
            .drives_between(today, Some(today + Duration::days(UPCOMING_WINDOW_DAYS)))?;

        Ok(DashboardMetrics {
            total_students,
            vaccinated_students,
            vaccinated_percentage,
            upcoming_drives,
        })
    }

    /// Vaccination report rows, optionally filtered by a case-insensitive
    /// vaccine-name substring, paginated by skip/limit.
    pub fn vaccination_report(
        &self,
        vaccine_name: Option<&str>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<ReportRow>, StoreError> {
        Ok(self
            .rows(vaccine_name)?
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    /// The full (unpaginated) report rendered as CSV with a fixed header.
    pub fn export_csv(&self, vaccine_name: Option<&str>) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_HEADER)?;
        for row in self.rows(vaccine_name)? {
            writer.write_record([
                row.student_name.as_str(),
                row.class.as_str(),
                row.vaccine_name.as_str(),
                &row.vaccination_date.to_string(),
            ])?;
        }
        let bytes = writer.into_inner().map_err(|err| err.into_error())?;
        String::from_utf8(bytes)
            .map_err(|err| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    fn rows(&self, vaccine_name: Option<&str>) -> Result<Vec<ReportRow>, StoreError> {
        let needle = vaccine_name.map(str::to_lowercase);
        Ok(self
            .store
            .vaccination_rows()?
            .into_iter()
            .filter(|(_, drive)| {
                needle
                    .as_deref()
                    .map_or(true, |name| drive.vaccine_name.to_lowercase().contains(name))
            })
            .map(|(student, drive)| ReportRow {
                student_name: student.name,
                class: student.student_class,
                vaccine_name: drive.vaccine_name,
                vaccination_date: drive.drive_date,
            })
            .collect())
    }
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Error raised while rendering the CSV export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to render csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finish csv output: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

//! Scheduling and eligibility rules for school vaccination drives.
//!
//! The store trait is the persistence seam; the scheduler, ledger, roster,
//! and report services layer the business rules on top of it, and the router
//! exposes them over HTTP.

pub mod domain;
pub mod ledger;
pub mod memory;
pub mod reports;
pub mod roster;
pub mod router;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    DashboardMetrics, Drive, DriveDraft, DriveId, ReportRow, Student, StudentDraft, StudentId,
    StudentView, VaccinationDetail,
};
pub use ledger::{LedgerError, VaccinationLedger};
pub use memory::MemoryStore;
pub use reports::{ExportError, ReportService, UPCOMING_WINDOW_DAYS};
pub use roster::{RosterError, RosterService};
pub use router::portal_router;
pub use scheduler::{DriveScheduler, ScheduleError, MIN_LEAD_DAYS};
pub use store::{StoreError, StudentFilter, VaccinationStore};

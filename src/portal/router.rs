use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::AppError;

use super::domain::{DashboardMetrics, DriveDraft, DriveId, StudentDraft, StudentId};
use super::ledger::{LedgerError, VaccinationLedger};
use super::reports::{ExportError, ReportService, UPCOMING_WINDOW_DAYS};
use super::roster::{RosterError, RosterService};
use super::scheduler::{DriveScheduler, ScheduleError};
use super::store::{StoreError, StudentFilter, VaccinationStore};

/// Router builder exposing the student, drive, ledger, dashboard, and
/// report endpoints over one store handle.
pub fn portal_router<S>(store: Arc<S>) -> Router
where
    S: VaccinationStore + 'static,
{
    let students = StudentState {
        roster: Arc::new(RosterService::new(store.clone())),
        ledger: Arc::new(VaccinationLedger::new(store.clone())),
    };
    let scheduler = Arc::new(DriveScheduler::new(store.clone()));
    let reports = Arc::new(ReportService::new(store));

    Router::new()
        .merge(student_routes(students))
        .merge(drive_routes(scheduler))
        .merge(report_routes(reports))
}

fn student_routes<S>(state: StudentState<S>) -> Router
where
    S: VaccinationStore + 'static,
{
    Router::new()
        .route(
            "/students",
            post(register_student::<S>).get(list_students::<S>),
        )
        .route("/students/bulk-upload", post(bulk_upload_students::<S>))
        .route("/students/:student_id", delete(remove_student::<S>))
        .route(
            "/students/:student_id/vaccinate/:drive_id",
            post(vaccinate_student::<S>),
        )
        .with_state(state)
}

fn drive_routes<S>(scheduler: Arc<DriveScheduler<S>>) -> Router
where
    S: VaccinationStore + 'static,
{
    Router::new()
        .route("/drives", post(schedule_drive::<S>).get(list_drives::<S>))
        .route("/drives/upcoming", get(upcoming_drives::<S>))
        .route("/drives/:drive_id", put(update_drive::<S>))
        .with_state(scheduler)
}

fn report_routes<S>(reports: Arc<ReportService<S>>) -> Router
where
    S: VaccinationStore + 'static,
{
    Router::new()
        .route("/dashboard", get(dashboard_metrics::<S>))
        .route("/reports", get(vaccination_report::<S>))
        .route("/reports/export/csv", get(export_report_csv::<S>))
        .with_state(reports)
}

/// Shared state for the student endpoints; registration and deletion are
/// owned by different services.
pub(crate) struct StudentState<S> {
    pub(crate) roster: Arc<RosterService<S>>,
    pub(crate) ledger: Arc<VaccinationLedger<S>>,
}

impl<S> Clone for StudentState<S> {
    fn clone(&self) -> Self {
        Self {
            roster: self.roster.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    pub(crate) vaccine_name: Option<String>,
    #[serde(default)]
    pub(crate) skip: usize,
    #[serde(default = "default_report_limit")]
    pub(crate) limit: usize,
}

fn default_report_limit() -> usize {
    10
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    pub(crate) vaccine_name: Option<String>,
}

pub(crate) async fn register_student<S>(
    State(state): State<StudentState<S>>,
    Json(draft): Json<StudentDraft>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match state.roster.register(draft) {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(err) => roster_error_response(err),
    }
}

pub(crate) async fn bulk_upload_students<S>(
    State(state): State<StudentState<S>>,
    body: String,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match state.roster.bulk_register(body.as_bytes()) {
        Ok(added) => {
            let payload = json!({
                "added": added,
                "message": format!("Successfully added {added} students."),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => roster_error_response(err),
    }
}

pub(crate) async fn list_students<S>(
    State(state): State<StudentState<S>>,
    Query(filter): Query<StudentFilter>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match state.roster.list(&filter) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(err) => roster_error_response(err),
    }
}

pub(crate) async fn remove_student<S>(
    State(state): State<StudentState<S>>,
    Path(student_id): Path<u64>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match state.ledger.delete_student(StudentId(student_id)) {
        Ok(()) => {
            let payload = json!({ "message": "Student deleted successfully." });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => ledger_error_response(err),
    }
}

pub(crate) async fn vaccinate_student<S>(
    State(state): State<StudentState<S>>,
    Path((student_id, drive_id)): Path<(u64, u64)>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match state
        .ledger
        .vaccinate(StudentId(student_id), DriveId(drive_id))
    {
        Ok(()) => {
            let payload = json!({ "message": "Student vaccinated successfully." });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => ledger_error_response(err),
    }
}

pub(crate) async fn schedule_drive<S>(
    State(scheduler): State<Arc<DriveScheduler<S>>>,
    Json(draft): Json<DriveDraft>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    let today = Local::now().date_naive();
    match scheduler.schedule(draft, today) {
        Ok(drive) => (StatusCode::CREATED, Json(drive)).into_response(),
        Err(err) => schedule_error_response(err),
    }
}

pub(crate) async fn update_drive<S>(
    State(scheduler): State<Arc<DriveScheduler<S>>>,
    Path(drive_id): Path<u64>,
    Json(draft): Json<DriveDraft>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    let today = Local::now().date_naive();
    match scheduler.update(DriveId(drive_id), draft, today) {
        Ok(drive) => (StatusCode::OK, Json(drive)).into_response(),
        Err(err) => schedule_error_response(err),
    }
}

pub(crate) async fn list_drives<S>(State(scheduler): State<Arc<DriveScheduler<S>>>) -> Response
where
    S: VaccinationStore + 'static,
{
    match scheduler.all_drives() {
        Ok(drives) => (StatusCode::OK, Json(drives)).into_response(),
        Err(err) => schedule_error_response(err),
    }
}

pub(crate) async fn upcoming_drives<S>(State(scheduler): State<Arc<DriveScheduler<S>>>) -> Response
where
    S: VaccinationStore + 'static,
{
    let today = Local::now().date_naive();
    match scheduler.upcoming(today, Some(UPCOMING_WINDOW_DAYS)) {
        Ok(drives) => (StatusCode::OK, Json(drives)).into_response(),
        Err(err) => schedule_error_response(err),
    }
}

pub(crate) async fn dashboard_metrics<S>(
    State(reports): State<Arc<ReportService<S>>>,
) -> Result<Json<DashboardMetrics>, AppError>
where
    S: VaccinationStore + 'static,
{
    let today = Local::now().date_naive();
    Ok(Json(reports.dashboard(today)?))
}

pub(crate) async fn vaccination_report<S>(
    State(reports): State<Arc<ReportService<S>>>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match reports.vaccination_report(query.vaccine_name.as_deref(), query.skip, query.limit) {
        Ok(results) => {
            let payload = json!({ "count": results.len(), "results": results });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => store_error_response(err),
    }
}

pub(crate) async fn export_report_csv<S>(
    State(reports): State<Arc<ReportService<S>>>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    S: VaccinationStore + 'static,
{
    match reports.export_csv(query.vaccine_name.as_deref()) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"vaccination_report.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(ExportError::Store(err)) => store_error_response(err),
        Err(err) => {
            error!(%err, "report export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
    }
}

fn schedule_error_response(err: ScheduleError) -> Response {
    let status = match &err {
        ScheduleError::NotFound => StatusCode::NOT_FOUND,
        ScheduleError::DateTaken => StatusCode::CONFLICT,
        ScheduleError::Validation | ScheduleError::LeadTime | ScheduleError::PastDrive => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScheduleError::Store(store) => return store_failure(store),
    };
    error_response(status, &err)
}

fn ledger_error_response(err: LedgerError) -> Response {
    let status = match &err {
        LedgerError::NotFound => StatusCode::NOT_FOUND,
        LedgerError::AlreadyVaccinatedForDrive | LedgerError::DuplicateVaccine => {
            StatusCode::CONFLICT
        }
        LedgerError::Store(store) => return store_failure(store),
    };
    error_response(status, &err)
}

fn roster_error_response(err: RosterError) -> Response {
    let status = match &err {
        RosterError::Validation | RosterError::MissingColumns | RosterError::Csv(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RosterError::Store(store) => return store_failure(store),
    };
    error_response(status, &err)
}

fn store_error_response(err: StoreError) -> Response {
    store_failure(&err)
}

fn store_failure(err: &StoreError) -> Response {
    error!(%err, "store failure");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err)
}

fn error_response(status: StatusCode, err: &dyn std::fmt::Display) -> Response {
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

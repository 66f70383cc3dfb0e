use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use vax_portal::config::AppConfig;
use vax_portal::error::AppError;
use vax_portal::portal::{
    portal_router, DriveDraft, DriveScheduler, MemoryStore, ReportService, RosterService,
    StudentFilter, VaccinationLedger,
};
use vax_portal::telemetry;

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "School Vaccination Portal",
    about = "Run the school vaccination drive service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed an in-memory portal and print the dashboard and report output
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct DemoArgs {
    /// Evaluation date for the demo (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Filter the printed report by a vaccine-name substring
    #[arg(long)]
    vaccine: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::default());

    let app = portal_router(store)
        .merge(
            Router::new()
                .route("/health", get(healthcheck))
                .route("/ready", get(readiness_endpoint))
                .route("/metrics", get(metrics_endpoint))
                .with_state(ops_state),
        )
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "school vaccination portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(MemoryStore::default());
    let roster = RosterService::new(store.clone());
    let scheduler = DriveScheduler::new(store.clone());
    let ledger = VaccinationLedger::new(store.clone());
    let reports = ReportService::new(store);

    let mmr = scheduler
        .schedule(demo_drive("MMR", today + Duration::days(20)), today)
        .map_err(AppError::portal)?;
    let polio = scheduler
        .schedule(demo_drive("Polio", today + Duration::days(25)), today)
        .map_err(AppError::portal)?;
    scheduler
        .schedule(demo_drive("Hepatitis B", today + Duration::days(45)), today)
        .map_err(AppError::portal)?;

    let added = roster
        .bulk_register(DEMO_ROSTER_CSV.as_bytes())
        .map_err(AppError::portal)?;
    println!("Seeded roster from CSV: {added} students added");

    let students = roster
        .list(&StudentFilter::default())
        .map_err(AppError::portal)?;
    for student in students.iter().take(2) {
        ledger
            .vaccinate(student.id, mmr.id)
            .map_err(AppError::portal)?;
    }
    if let Some(first) = students.first() {
        ledger
            .vaccinate(first.id, polio.id)
            .map_err(AppError::portal)?;
    }

    let metrics = reports.dashboard(today)?;
    println!("\nDashboard ({today})");
    println!("- Students registered: {}", metrics.total_students);
    println!("- Students vaccinated: {}", metrics.vaccinated_students);
    println!("- Coverage: {:.2}%", metrics.vaccinated_percentage);
    println!("\nUpcoming drives (next 30 days)");
    for drive in &metrics.upcoming_drives {
        println!(
            "- {} on {} ({} doses, classes {})",
            drive.vaccine_name, drive.drive_date, drive.doses_available, drive.applicable_classes
        );
    }

    let filter = args.vaccine.as_deref();
    let rows = reports
        .vaccination_report(filter, 0, usize::MAX)
        .map_err(AppError::from)?;
    println!("\nVaccination report");
    if rows.is_empty() {
        println!("- no matching records");
    } else {
        for row in &rows {
            println!(
                "- {} ({}) received {} on {}",
                row.student_name, row.class, row.vaccine_name, row.vaccination_date
            );
        }
    }

    let csv = reports.export_csv(filter).map_err(AppError::portal)?;
    println!("\nCSV export\n{csv}");

    Ok(())
}

fn demo_drive(vaccine: &str, date: NaiveDate) -> DriveDraft {
    DriveDraft {
        vaccine_name: vaccine.to_string(),
        drive_date: date,
        doses_available: 120,
        applicable_classes: "Grades 5-7".to_string(),
    }
}

const DEMO_ROSTER_CSV: &str = "\
name,student_class
Asha Rao,5A
Liam Ortiz,5B
Mina Patel,6A
,6B
Noor Khan,7A
";

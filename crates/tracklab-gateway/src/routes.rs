//! API route handlers for the gateway.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use tracklab_analysis::run_daily_analysis;
use tracklab_core::TrackLabError;
use tracklab_core::types::{BusEvent, NewWorkLog, PlanStatus};

use super::server::AppState;

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn error_body(detail: impl std::fmt::Display) -> Json<Value> {
    Json(json!({ "success": false, "detail": detail.to_string() }))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tracklab-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

// ── Work logs ───────────────────────────────────────────────────────────────

/// Log an activity (the core hourly capture action).
///
/// Stores the log, auto-starts a Not Started activity on first log, cascades
/// the parent project's status, and broadcasts `activity_logged`.
pub async fn create_work_log(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewWorkLog>,
) -> (StatusCode, Json<Value>) {
    match state.db.get_plan(body.plan_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_body(format!("Plan {} not found.", body.plan_id)),
            );
        }
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }
    match state.db.get_project(body.project_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_body(format!("Project {} not found.", body.project_id)),
            );
        }
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }

    match state
        .db
        .insert_work_log(&body, state.config.cascade.auto_complete_projects)
    {
        Ok(log) => {
            state.hub.broadcast(&BusEvent::activity_logged(log.clone()));
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "data": log,
                    "message": "Activity logged successfully.",
                })),
            )
        }
        Err(e @ TrackLabError::InvalidDuration { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, error_body(e))
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub date: Option<String>,
    pub project_id: Option<i64>,
    pub plan_id: Option<i64>,
}

/// Get work logs filtered by date, project, or plan.
pub async fn list_work_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> (StatusCode, Json<Value>) {
    match state
        .db
        .list_work_logs(query.date.as_deref(), query.project_id, query.plan_id)
    {
        Ok(logs) => {
            let total_minutes: i64 = logs.iter().map(|l| l.duration_minutes).sum();
            let total_hours = (total_minutes as f64 / 60.0 * 100.0).round() / 100.0;
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {
                        "date": query.date,
                        "total_hours": total_hours,
                        "logs": logs,
                    },
                })),
            )
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }
}

// ── Plans ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlanStatusRequest {
    pub status: PlanStatus,
}

/// Change a plan's status. Activating demotes any other Active plan; every
/// change is pushed to clients as `plan_updated`.
pub async fn set_plan_status(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
    Json(body): Json<PlanStatusRequest>,
) -> (StatusCode, Json<Value>) {
    match state.db.set_plan_status(plan_id, body.status) {
        Ok(plan) => {
            state
                .hub
                .broadcast(&BusEvent::plan_updated(plan.id, plan.status));
            (
                StatusCode::OK,
                Json(json!({ "success": true, "data": plan })),
            )
        }
        Err(TrackLabError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Plan {plan_id} not found.")),
        ),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }
}

// ── Analysis ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    pub date: Option<String>,
}

/// Trigger the end-of-day analysis for a date (defaults to today).
///
/// Fired automatically by the scheduler at the configured hour, or manually
/// from the Settings page. Only an unreachable Ollama endpoint is an error;
/// an unparseable reply is stored as a degraded summary.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalysisRequest>,
) -> (StatusCode, Json<Value>) {
    let date = body.date.unwrap_or_else(today);
    match run_daily_analysis(
        &state.db,
        &state.ollama,
        &date,
        state.config.ollama.analysis_enabled,
    )
    .await
    {
        Ok(summary) => {
            state.hub.broadcast(&BusEvent::summary_ready(date));
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": summary,
                    "message": "Daily analysis completed successfully.",
                })),
            )
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            error_body(format!("Ollama analysis failed: {e}")),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Retrieve a stored daily summary.
pub async fn daily_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> (StatusCode, Json<Value>) {
    let date = query.date.unwrap_or_else(today);
    match state.db.get_daily_summary(&date) {
        Ok(Some(summary)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": summary })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(format!("No summary found for {date}.")),
        ),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }
}

/// Check whether the Ollama server is reachable and the model is loaded.
pub async fn ollama_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let health = state.ollama.health().await;
    Json(json!({ "success": true, "data": health }))
}

// ── Popups ──────────────────────────────────────────────────────────────────

/// Broadcast the activity popup immediately (debug/manual trigger).
pub async fn popup_now(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.hub.broadcast(&BusEvent::activity_popup());
    Json(json!({ "success": true, "message": "Popup broadcast." }))
}

#[derive(Debug, Deserialize)]
pub struct SchedulePopupRequest {
    pub minutes: i64,
}

/// Schedule a one-shot popup N minutes from now.
pub async fn schedule_popup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SchedulePopupRequest>,
) -> Json<Value> {
    state.scheduler.schedule_popup_in(body.minutes);
    Json(json!({
        "success": true,
        "message": format!("Popup scheduled in {} minute(s).", body.minutes),
    }))
}

// ── Dashboard ───────────────────────────────────────────────────────────────

/// The complete dashboard payload.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.db.dashboard(&today()) {
        Ok(payload) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": payload })),
        ),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::NotificationHub;
    use tracklab_analysis::OllamaClient;
    use tracklab_core::TrackLabConfig;
    use tracklab_core::types::{ActivityStatus, ProjectStatus};
    use tracklab_db::Database;
    use tracklab_scheduler::{SchedulerClient, SchedulerCommand};

    fn test_state() -> (Arc<AppState>, tokio::sync::mpsc::UnboundedReceiver<SchedulerCommand>) {
        let mut config = TrackLabConfig::default();
        config.ollama.port = 1; // unreachable on purpose
        let (scheduler, commands) = SchedulerClient::channel();
        let state = AppState {
            ollama: Arc::new(OllamaClient::new(&config.ollama)),
            config,
            db: Arc::new(Database::open_in_memory().unwrap()),
            hub: Arc::new(NotificationHub::new()),
            scheduler,
            start_time: std::time::Instant::now(),
        };
        (Arc::new(state), commands)
    }

    fn seed(state: &AppState) -> (i64, i64, i64) {
        let plan = state.db.create_plan("Sprint 12", None, "2026-02-16", "2026-02-27").unwrap();
        let project = state.db.create_project(plan.id, "Genome Assembly", None, None, None).unwrap();
        let activity = state.db.create_activity(project.id, "QC raw reads", None, 4.0).unwrap();
        (plan.id, project.id, activity.id)
    }

    #[tokio::test]
    async fn test_log_work_end_to_end() {
        let (state, _commands) = test_state();
        let (plan_id, project_id, activity_id) = seed(&state);
        // subscriber registered before the log call
        let (_sub, mut rx) = state.hub.subscribe();

        let (status, body) = create_work_log(
            State(state.clone()),
            Json(NewWorkLog {
                plan_id,
                project_id,
                activity_id: Some(activity_id),
                comment: "ran fastqc on the new batch".into(),
                duration_minutes: 60,
                timestamp: None,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0["success"], true);

        let activity = state.db.get_activity(activity_id).unwrap().unwrap();
        assert_eq!(activity.status, ActivityStatus::InProgress);
        let project = state.db.get_project(project_id).unwrap().unwrap();
        assert_eq!(project.status, ProjectStatus::Active);

        let payload = rx.try_recv().unwrap();
        let event: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(event["type"], "activity_logged");
        assert_eq!(event["data"]["comment"], "ran fastqc on the new batch");
    }

    #[tokio::test]
    async fn test_log_with_bad_duration_is_422() {
        let (state, _commands) = test_state();
        let (plan_id, project_id, _) = seed(&state);
        let (status, _) = create_work_log(
            State(state.clone()),
            Json(NewWorkLog {
                plan_id,
                project_id,
                activity_id: None,
                comment: "way too long".into(),
                duration_minutes: 9999,
                timestamp: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_log_against_missing_project_is_404() {
        let (state, _commands) = test_state();
        let (plan_id, _, _) = seed(&state);
        let (status, _) = create_work_log(
            State(state.clone()),
            Json(NewWorkLog {
                plan_id,
                project_id: 999,
                activity_id: None,
                comment: "ghost project".into(),
                duration_minutes: 30,
                timestamp: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_analysis_empty_day() {
        let (state, _commands) = test_state();
        let (_sub, mut rx) = state.hub.subscribe();

        let (status, body) = run_analysis(
            State(state.clone()),
            Json(AnalysisRequest { date: Some("2026-02-24".into()) }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["data"]["summary_text"], "No activity logs for 2026-02-24.");

        let event: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(event["type"], "summary_ready");
        assert_eq!(event["data"]["date"], "2026-02-24");
    }

    #[tokio::test]
    async fn test_daily_summary_lookup() {
        let (state, _commands) = test_state();
        let (status, _) = daily_summary(
            State(state.clone()),
            Query(DateQuery { date: Some("2026-02-24".into()) }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        state
            .db
            .upsert_daily_summary(
                None,
                "2026-02-24",
                &tracklab_core::types::AnalysisReport::empty("stored"),
            )
            .unwrap();

        let (status, body) = daily_summary(
            State(state.clone()),
            Query(DateQuery { date: Some("2026-02-24".into()) }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["data"]["summary_text"], "stored");
    }

    #[tokio::test]
    async fn test_plan_status_broadcasts_plan_updated() {
        let (state, _commands) = test_state();
        let (plan_id, _, _) = seed(&state);
        let (_sub, mut rx) = state.hub.subscribe();

        let (status, _) = set_plan_status(
            State(state.clone()),
            Path(plan_id),
            Json(PlanStatusRequest { status: PlanStatus::Completed }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let event: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(event["type"], "plan_updated");
        assert_eq!(event["data"]["status"], "Completed");
    }

    #[tokio::test]
    async fn test_schedule_popup_sends_command() {
        let (state, mut commands) = test_state();
        schedule_popup(State(state.clone()), Json(SchedulePopupRequest { minutes: 5 })).await;
        match commands.try_recv().unwrap() {
            SchedulerCommand::PopupIn { minutes } => assert_eq!(minutes, 5),
            SchedulerCommand::Shutdown => panic!("wrong command"),
        }
    }
}

//! Route handlers
//!
//! Handlers are thin: extract, call one service, wrap the result. Extractor
//! rejections are turned into validation errors so every failure uses the
//! same envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::response::{ok, ApiError, ApiResponse, ApiResult};
use crate::app::AppContext;
use crate::catalog::RoutineSummary;
use crate::error::{ErrorCode, PlannerError};
use crate::model::{
    Assignment, AssignmentId, CalendarEntry, Exercise, MediaRef, Patient, PatientId, Routine,
    RoutineDraft, RoutineExercise, RoutineId, SymptomReport,
};
use crate::plan::DailyPlan;
use crate::reports::{PatientReportSummary, ReportInput};
use crate::scheduler::AssignRequest;
use crate::storage::HealthStatus;

pub type ApiState = Arc<AppContext>;

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn created<T>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        ApiError(PlannerError::validation_with_code(
            ErrorCode::VALIDATION_INVALID_FORMAT,
            rejection.body_text(),
            None,
        ))
    })
}

fn path_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        ApiError(PlannerError::validation_with_code(
            ErrorCode::VALIDATION_INVALID_FORMAT,
            rejection.body_text(),
            Some("id".to_string()),
        ))
    })
}

/// Picker row for the assignment screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientOption {
    pub id: PatientId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPatientRequest {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewExerciseRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub media: Option<MediaRef>,
}

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub date: Option<NaiveDate>,
}

/// Exercise row of a routine as the editor shows it
#[derive(Debug, Serialize)]
pub struct RoutineExerciseRow {
    #[serde(flatten)]
    pub entry: RoutineExercise,
    pub name: String,
    pub reps_or_duration: String,
}

pub async fn health_check(State(state): State<ApiState>) -> ApiResult<HealthStatus> {
    let health = state
        .storage
        .health_check()
        .await
        .map_err(PlannerError::from)?;
    ok(health)
}

// Directory

pub async fn assignable_patients(State(state): State<ApiState>) -> ApiResult<Vec<PatientOption>> {
    let patients = state.directory.assignable_patients().await?;
    ok(patients
        .into_iter()
        .map(|p| PatientOption {
            id: p.id,
            name: p.full_name,
        })
        .collect())
}

pub async fn register_patient(
    State(state): State<ApiState>,
    payload: Result<Json<NewPatientRequest>, JsonRejection>,
) -> Created<Patient> {
    let request = body(payload)?;
    created(
        state
            .directory
            .register_patient(&request.full_name, &request.email)
            .await?,
    )
}

pub async fn approve_patient(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Patient> {
    let patient_id = path_id(patient_id)?;
    ok(state.directory.approve(PatientId(patient_id)).await?)
}

pub async fn deactivate_patient(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Patient> {
    let patient_id = path_id(patient_id)?;
    ok(state.directory.deactivate(PatientId(patient_id)).await?)
}

// Catalog

pub async fn create_exercise(
    State(state): State<ApiState>,
    payload: Result<Json<NewExerciseRequest>, JsonRejection>,
) -> Created<Exercise> {
    let request = body(payload)?;
    created(
        state
            .catalog
            .create_exercise(&request.name, &request.description, request.media)
            .await?,
    )
}

pub async fn list_exercises(State(state): State<ApiState>) -> ApiResult<Vec<Exercise>> {
    ok(state.catalog.list_exercises().await?)
}

pub async fn list_routines(State(state): State<ApiState>) -> ApiResult<Vec<RoutineSummary>> {
    ok(state.catalog.list_routines().await?)
}

pub async fn create_routine(
    State(state): State<ApiState>,
    payload: Result<Json<RoutineDraft>, JsonRejection>,
) -> Created<Routine> {
    let draft = body(payload)?;
    created(state.catalog.create_routine(draft).await?)
}

pub async fn update_routine(
    State(state): State<ApiState>,
    routine_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<RoutineDraft>, JsonRejection>,
) -> ApiResult<Routine> {
    let routine_id = path_id(routine_id)?;
    let draft = body(payload)?;
    ok(state.catalog.update_routine(RoutineId(routine_id), draft).await?)
}

pub async fn delete_routine(
    State(state): State<ApiState>,
    routine_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<()> {
    let routine_id = path_id(routine_id)?;
    state.catalog.delete_routine(RoutineId(routine_id)).await?;
    ok(())
}

pub async fn routine_exercises(
    State(state): State<ApiState>,
    routine_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Vec<RoutineExerciseRow>> {
    let routine_id = path_id(routine_id)?;
    let rows = state.catalog.routine_exercises(RoutineId(routine_id)).await?;
    ok(rows
        .into_iter()
        .map(|(entry, exercise)| RoutineExerciseRow {
            reps_or_duration: entry.dosage.to_string(),
            name: exercise.name,
            entry,
        })
        .collect())
}

// Calendar

pub async fn assign(
    State(state): State<ApiState>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Created<Assignment> {
    let request = body(payload)?;
    created(state.scheduler.assign_request(&request).await?)
}

pub async fn unassign(
    State(state): State<ApiState>,
    assignment_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<()> {
    let assignment_id = path_id(assignment_id)?;
    state.scheduler.unassign(AssignmentId(assignment_id)).await?;
    ok(())
}

pub async fn calendar(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Vec<CalendarEntry>> {
    let patient_id = path_id(patient_id)?;
    ok(state.scheduler.get_calendar(PatientId(patient_id)).await?)
}

// Patient side

pub async fn daily_plan(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<PlanQuery>, QueryRejection>,
) -> ApiResult<DailyPlan> {
    let patient_id = path_id(patient_id)?;
    let Query(query) = query.map_err(|rejection| {
        ApiError(PlannerError::validation_with_code(
            ErrorCode::VALIDATION_INVALID_FORMAT,
            rejection.body_text(),
            Some("date".to_string()),
        ))
    })?;
    let patient_id = PatientId(patient_id);
    let plan = match query.date {
        Some(date) => state.resolver.resolve(patient_id, date).await?,
        None => state.resolver.resolve_today(patient_id).await?,
    };
    ok(plan)
}

pub async fn submit_report(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ReportInput>, JsonRejection>,
) -> Created<SymptomReport> {
    let patient_id = path_id(patient_id)?;
    let input = body(payload)?;
    created(state.reports.submit_today(PatientId(patient_id), input).await?)
}

pub async fn update_report(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ReportInput>, JsonRejection>,
) -> ApiResult<SymptomReport> {
    let patient_id = path_id(patient_id)?;
    let input = body(payload)?;
    ok(state.reports.update_today(PatientId(patient_id), input).await?)
}

pub async fn today_report(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Option<SymptomReport>> {
    let patient_id = path_id(patient_id)?;
    ok(state.reports.get_today(PatientId(patient_id)).await?)
}

pub async fn delete_report(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<()> {
    let patient_id = path_id(patient_id)?;
    state.reports.delete_today(PatientId(patient_id)).await?;
    ok(())
}

// Clinician reports

pub async fn patient_reports(
    State(state): State<ApiState>,
    patient_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Vec<SymptomReport>> {
    let patient_id = path_id(patient_id)?;
    ok(state.reports.reports_for_patient(PatientId(patient_id)).await?)
}

pub async fn report_summary(State(state): State<ApiState>) -> ApiResult<Vec<PatientReportSummary>> {
    ok(state.reports.report_summary().await?)
}

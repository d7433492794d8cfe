use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    AssignmentDraft, AssignmentKey, ScheduleId, SectionId, TeacherId, TimeSlot,
};
use super::error::SchedulingError;
use super::lifecycle::{CancelFlag, FinalizeOptions};
use super::registry::ReferenceRegistry;
use super::service::SchedulingService;

/// Router builder exposing the engine operations under `/api/v1/schedules`.
pub fn scheduling_router<R>(service: Arc<SchedulingService<R>>) -> Router
where
    R: ReferenceRegistry + 'static,
{
    Router::new()
        .route("/api/v1/schedules", post(create_handler::<R>))
        .route("/api/v1/schedules/:schedule_id", get(snapshot_handler::<R>))
        .route(
            "/api/v1/schedules/:schedule_id/assignments",
            post(upsert_handler::<R>).delete(remove_handler::<R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id/effective",
            get(effective_handler::<R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id/load",
            get(roster_handler::<R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id/teachers/:teacher_id/load",
            get(load_handler::<R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id/sections/:section_id/homeroom",
            put(homeroom_handler::<R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id/finalize",
            post(finalize_handler::<R>),
        )
        .route(
            "/api/v1/schedules/:schedule_id/archive",
            post(archive_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateScheduleRequest {
    pub(crate) name: String,
    pub(crate) academic_year: String,
    #[serde(default)]
    pub(crate) time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub(crate) section_ids: Vec<SectionId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EffectiveQuery {
    pub(crate) date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HomeroomRequest {
    pub(crate) teacher_id: TeacherId,
}

fn error_response(error: SchedulingError) -> Response {
    let status = match &error {
        SchedulingError::Validation(_) | SchedulingError::Qualification { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SchedulingError::NotFound { .. } => StatusCode::NOT_FOUND,
        SchedulingError::Conflict { .. }
        | SchedulingError::IncompleteSchedule { .. }
        | SchedulingError::ImmutableSchedule { .. } => StatusCode::CONFLICT,
        SchedulingError::DependencyTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        SchedulingError::OperationCancelled => StatusCode::SERVICE_UNAVAILABLE,
    };

    let mut payload = json!({
        "code": error.code(),
        "error": error.to_string(),
    });
    if let SchedulingError::IncompleteSchedule { missing } = &error {
        payload["missing"] = json!(missing);
    }

    (status, Json(payload)).into_response()
}

async fn create_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Json(request): Json<CreateScheduleRequest>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.create_schedule(
        request.name,
        request.academic_year,
        request.time_slots,
        request.section_ids,
    ) {
        Ok(snapshot) => (StatusCode::CREATED, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn snapshot_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.snapshot(&ScheduleId(schedule_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn upsert_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
    Json(draft): Json<AssignmentDraft>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.upsert_assignment(&ScheduleId(schedule_id), draft) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn remove_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
    Json(key): Json<AssignmentKey>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.remove_assignment(&ScheduleId(schedule_id), &key) {
        Ok(removed) => (StatusCode::OK, Json(removed)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn effective_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
    Query(query): Query<EffectiveQuery>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.effective_schedule(&ScheduleId(schedule_id), query.date) {
        Ok(cells) => (
            StatusCode::OK,
            Json(json!({ "date": query.date, "cells": cells })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn load_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path((schedule_id, teacher_id)): Path<(String, String)>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.teacher_load(&ScheduleId(schedule_id), &TeacherId(teacher_id)) {
        Ok(load) => (StatusCode::OK, Json(load)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn roster_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.teacher_loads(&ScheduleId(schedule_id)) {
        Ok(loads) => (StatusCode::OK, Json(loads)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn homeroom_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path((schedule_id, section_id)): Path<(String, String)>,
    Json(request): Json<HomeroomRequest>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.set_homeroom(
        &ScheduleId(schedule_id),
        &SectionId(section_id),
        &request.teacher_id,
    ) {
        Ok(previous) => (
            StatusCode::OK,
            Json(json!({ "replaced": previous })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn finalize_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
    Json(options): Json<FinalizeOptions>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    let cancel = CancelFlag::new();
    match service.finalize(&ScheduleId(schedule_id), options, &cancel) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn archive_handler<R>(
    State(service): State<Arc<SchedulingService<R>>>,
    Path(schedule_id): Path<String>,
) -> Response
where
    R: ReferenceRegistry + 'static,
{
    match service.archive(&ScheduleId(schedule_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use classtime::scheduling::{scheduling_router, ReferenceRegistry, SchedulingService};

pub(crate) fn with_scheduling_routes<R>(service: Arc<SchedulingService<R>>) -> axum::Router
where
    R: ReferenceRegistry + 'static,
{
    scheduling_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::sample_roster;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use classtime::scheduling::SchedulingPolicy;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let registry = Arc::new(sample_roster());
        let service = Arc::new(SchedulingService::new(registry, SchedulingPolicy::default()));
        with_scheduling_routes(service)
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let router = build_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("status"), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn engine_routes_are_mounted() {
        let router = build_router();
        let payload = json!({
            "name": "Grade 10 weekly timetable",
            "academic_year": "2025-2026",
            "time_slots": [],
            "section_ids": ["10-A"]
        });
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/schedules")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

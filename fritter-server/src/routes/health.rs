use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use fritter_shared::clients::db::checkout;
use fritter_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

fn probe_database(state: &AppState) -> HealthCheck {
    let result = checkout(&state.db).and_then(|mut conn| {
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map_err(Into::into)
    });

    match result {
        Ok(_) => HealthCheck {
            name: "database".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(e) => HealthCheck {
            name: "database".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
        },
    }
}

/// Health check that probes the database.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let response = HealthResponse::healthy("fritter-server", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![probe_database(&state)]);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

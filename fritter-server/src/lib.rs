pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod validation;
pub mod views;

use fritter_shared::clients::db::DbPool;
use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub db: DbPool,
    pub config: config::AppConfig,
    /// Absent when another recorder is already installed (tests).
    pub metrics_handle: Option<PrometheusHandle>,
}

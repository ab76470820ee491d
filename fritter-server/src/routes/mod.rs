pub mod comments;
pub mod followers;
pub mod freets;
pub mod good_sport_score;
pub mod health;
pub mod reactions;
pub mod session;
pub mod users;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use fritter_shared::middleware::metrics_middleware;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origin_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let api = Router::new()
        .route("/users", post(users::create_user).put(users::update_user).delete(users::delete_user))
        .route(
            "/users/session",
            get(session::current_user).post(session::sign_in).delete(session::sign_out),
        )
        .route("/users/session/refresh", post(session::refresh))
        .route("/users/:username/freets", get(users::freets_by_username))
        .route("/freets", get(freets::list_freets).post(freets::create_freet))
        .route("/freets/feed", get(freets::feed))
        .route("/freets/explore", get(freets::explore))
        .route("/freets/memories", get(freets::memories))
        .route("/freets/:freetId", put(freets::update_freet).delete(freets::delete_freet))
        .route("/comments", get(comments::list_comments).post(comments::create_comment))
        .route("/comments/:commentId", delete(comments::delete_comment))
        .route("/likes", get(reactions::like_exists).post(reactions::add_like))
        .route("/likes/:parentId", delete(reactions::remove_like))
        .route("/flags", get(reactions::flag_exists).post(reactions::add_flag))
        .route("/flags/:parentId", delete(reactions::remove_flag))
        .route("/followers", get(followers::follow_stats).post(followers::follow))
        .route("/followers/:followee", delete(followers::unfollow))
        .route("/goodsportscore", get(good_sport_score::get_score));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api)
        .route_layer(axum::middleware::from_fn(metrics_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::list([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ]))
                .allow_headers(AllowHeaders::list([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                ]))
                .allow_credentials(true),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use fritter_shared::clients::db::create_lazy_pool;
    use fritter_shared::middleware::{jwt_secret, sign_jwt};
    use fritter_shared::types::auth::Claims;

    use crate::config::AppConfig;
    use crate::AppState;

    /// Router over a pool that never connects; only requests rejected before
    /// checkout succeed.
    pub fn app() -> Router {
        let config = AppConfig {
            database_url: "postgres://nobody@127.0.0.1:1/none".into(),
            ..AppConfig::default()
        };
        let state = Arc::new(AppState {
            db: create_lazy_pool(&config.database_url),
            config,
            metrics_handle: None,
        });
        super::router(state)
    }

    pub fn bearer() -> String {
        let claims = Claims::new(Uuid::new_v4(), "alice", 600);
        format!("Bearer {}", sign_jwt(&claims, &jwt_secret()).unwrap())
    }

    pub async fn send(
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub fn error_code(body: &serde_json::Value) -> &str {
        body["error"]["code"].as_str().unwrap_or_default()
    }
}

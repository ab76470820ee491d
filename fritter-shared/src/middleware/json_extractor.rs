use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AppError;

/// `axum::Json` that rejects bad bodies with the API error envelope
/// (400, `E0002`) instead of axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Serialize)]
    struct Note {
        content: String,
    }

    async fn echo(Json(note): Json<Note>) -> Json<Note> {
        Json(note)
    }

    fn app() -> Router {
        Router::new().route("/notes", post(echo))
    }

    async fn post_body(content_type: Option<&str>, body: &'static str) -> (StatusCode, serde_json::Value) {
        let mut request = Request::post("/notes");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let resp = app()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn well_typed_body_passes_through() {
        let (status, body) = post_body(Some("application/json"), r#"{"content":"hi"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "hi");
    }

    #[tokio::test]
    async fn mistyped_field_is_a_validation_error() {
        let (status, body) = post_body(Some("application/json"), r#"{"content":5}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E0002");
        assert!(body["error"]["message"].as_str().unwrap().contains("content"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let (status, body) = post_body(Some("application/json"), "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E0002");
    }

    #[tokio::test]
    async fn missing_content_type_is_a_validation_error() {
        let (status, body) = post_body(None, r#"{"content":"hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E0002");
    }
}

//! HTTP 요청 메트릭 미들웨어.
//!
//! 경로 라벨은 [`normalize_path`]로 정규화하므로 도서 id마다 시계열이
//! 늘어나지 않습니다. 401/403 응답은 `http_auth_rejections_total`에도 남깁니다.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::metrics::{
    normalize_path, record_auth_rejection, record_http_duration, record_http_request,
    record_http_response,
};

/// 메트릭 라벨로 쓰는 요청 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    pub method: String,
    pub path: String,
}

impl RequestLabels {
    pub fn new(method: &Method, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: normalize_path(path),
        }
    }

    pub fn from_request(request: &Request) -> Self {
        Self::new(request.method(), request.uri().path())
    }
}

/// 인증 거부로 집계할 상태 코드.
pub fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// HTTP 메트릭 수집 레이어.
///
/// - `http_requests_total{method,path}`
/// - `http_responses_total{method,path,status}`
/// - `http_request_duration_seconds{method,path}`
/// - `http_auth_rejections_total{method,path,status}` (401/403만)
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let labels = RequestLabels::from_request(&request);

    record_http_request(&labels.method, &labels.path);

    let response = next.run(request).await;
    let status = response.status();

    record_http_response(&labels.method, &labels.path, status.as_u16());
    record_http_duration(&labels.method, &labels.path, start.elapsed().as_secs_f64());
    if is_auth_rejection(status) {
        record_auth_rejection(&labels.method, &labels.path, status.as_u16());
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_labels_normalize_book_ids() {
        let request = http::Request::builder()
            .method(Method::GET)
            .uri("/api/books/42?expand=true")
            .body(Body::empty())
            .unwrap();

        let labels = RequestLabels::from_request(&request);
        assert_eq!(labels.method, "GET");
        assert_eq!(labels.path, "/api/books/:id");
    }

    #[test]
    fn test_labels_keep_static_paths() {
        let labels = RequestLabels::new(&Method::POST, "/api/auth/login");
        assert_eq!(labels.path, "/api/auth/login");
        assert_eq!(labels.method, "POST");
    }

    #[test]
    fn test_auth_rejection_statuses() {
        assert!(is_auth_rejection(StatusCode::UNAUTHORIZED));
        assert!(is_auth_rejection(StatusCode::FORBIDDEN));
        assert!(!is_auth_rejection(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(!is_auth_rejection(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_layer_passes_responses_through() {
        let app = Router::new()
            .route("/api/books/{id}", get(|| async { "OK" }))
            .route("/api/books", get(|| async { StatusCode::FORBIDDEN }))
            .layer(middleware::from_fn(metrics_layer));

        let ok = app
            .clone()
            .oneshot(http::Request::builder().uri("/api/books/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let denied = app
            .oneshot(http::Request::builder().uri("/api/books").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }
}

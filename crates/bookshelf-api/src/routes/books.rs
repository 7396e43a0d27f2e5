//! 도서 endpoint.
//!
//! 목록 조회는 관리자 전용이고, 나머지는 로그인한 사용자 누구나 사용합니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use bookshelf_core::{Book, NewBook};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{require_role, AccessGate, AuthClaims, RoleSet};
use crate::error::{invalid_body, ApiError, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 도서 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookListResponse {
    pub message: String,
    pub data: Vec<Book>,
}

/// 도서 단건 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub message: String,
    pub data: Book,
}

/// 도서 목록 (관리자 전용).
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    responses(
        (status = 200, description = "도서 목록", body = BookListResponse),
        (status = 401, description = "토큰 없음 또는 무효", body = ApiErrorResponse),
        (status = 403, description = "관리자 아님", body = ApiErrorResponse)
    )
)]
pub async fn list_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<BookListResponse>> {
    let books = state.books.list().await?;

    Ok(Json(BookListResponse {
        message: "books fetched successfully".to_string(),
        data: books,
    }))
}

/// 도서 단건 조회.
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "도서 ID")),
    responses(
        (status = 200, description = "도서", body = BookResponse),
        (status = 404, description = "없는 도서", body = ApiErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BookResponse>> {
    let book = state
        .books
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("book {} not found", id)))?;

    Ok(Json(BookResponse {
        message: "book fetched successfully".to_string(),
        data: book,
    }))
}

/// 도서 등록.
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = NewBook,
    responses(
        (status = 200, description = "등록된 도서", body = BookResponse),
        (status = 401, description = "토큰 없음 또는 무효", body = ApiErrorResponse),
        (status = 422, description = "잘못된 요청 본문", body = ApiErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> ApiResult<Json<BookResponse>> {
    let Json(new_book) = payload.map_err(invalid_body)?;
    let book = state.books.create(new_book).await?;
    info!(book_id = book.id, user_id = claims.id, "Book created");

    Ok(Json(BookResponse {
        message: "book has been added".to_string(),
        data: book,
    }))
}

/// 도서 라우터.
pub fn books_router(gate: &AccessGate) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(list_books).route_layer(middleware::from_fn_with_state(
                gate.guard(RoleSet::admin()),
                require_role,
            )),
        )
        .route(
            "/",
            post(create_book).route_layer(middleware::from_fn_with_state(
                gate.guard(RoleSet::any()),
                require_role,
            )),
        )
        .route(
            "/{id}",
            get(get_book).route_layer(middleware::from_fn_with_state(
                gate.guard(RoleSet::any()),
                require_role,
            )),
        )
}

pub mod companies;
pub mod health;
pub mod jobs;

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/jobs",
            get(jobs::handle_list).post(jobs::handle_create),
        )
        .route(
            "/jobs/:id",
            get(jobs::handle_get)
                .patch(jobs::handle_update)
                .delete(jobs::handle_remove),
        )
        .route(
            "/companies",
            get(companies::handle_list).post(companies::handle_create),
        )
        .route(
            "/companies/:handle",
            get(companies::handle_get)
                .patch(companies::handle_update)
                .delete(companies::handle_remove),
        )
        .with_state(state)
}

/// `Json` wrapper that reports malformed bodies and schema violations as a
/// 400 instead of axum's default rejection statuses.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, AppError> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(AppJson(value))
    }
}

/// `Query` wrapper with the same 400 mapping for bad filter parameters.
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, AppError> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(AppQuery(value))
    }
}

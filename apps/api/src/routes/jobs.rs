//! Job route handlers. Reads are open to anonymous callers; mutations
//! require an admin token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::job::{self, JobFilter, JobUpdate, NewJob};
use crate::routes::{AppJson, AppQuery};
use crate::state::AppState;

/// POST /jobs (admin only). Returns 201 with the created job.
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppJson(req): AppJson<NewJob>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let job = job::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn handle_list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<JobFilter>,
) -> Result<Json<Value>, AppError> {
    let jobs = job::find_all(&state.db, &filter).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// GET /jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let job = job::get(&state.db, id).await?;
    Ok(Json(json!({ "job": job })))
}

/// PATCH /jobs/:id (admin only).
pub async fn handle_update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    AppJson(req): AppJson<JobUpdate>,
) -> Result<Json<Value>, AppError> {
    let job = job::update(&state.db, id, req).await?;
    Ok(Json(json!({ "job": job })))
}

/// DELETE /jobs/:id (admin only). Returns a deletion confirmation payload.
pub async fn handle_remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    job::remove(&state.db, id).await?;
    Ok(Json(json!({ "deleted": id })))
}

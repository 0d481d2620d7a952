//! Company route handlers, keyed by handle. Same auth rules as jobs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::company::{self, CompanyFilter, CompanyUpdate, NewCompany};
use crate::routes::{AppJson, AppQuery};
use crate::state::AppState;

/// POST /companies (admin only). Returns 201 with the created company.
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppJson(req): AppJson<NewCompany>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let company = company::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

/// GET /companies?name=&minEmployees=&maxEmployees=
pub async fn handle_list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<CompanyFilter>,
) -> Result<Json<Value>, AppError> {
    let companies = company::find_all(&state.db, &filter).await?;
    Ok(Json(json!({ "companies": companies })))
}

/// GET /companies/:handle
pub async fn handle_get(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Value>, AppError> {
    let company = company::get(&state.db, &handle).await?;
    Ok(Json(json!({ "company": company })))
}

/// PATCH /companies/:handle (admin only).
pub async fn handle_update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(handle): Path<String>,
    AppJson(req): AppJson<CompanyUpdate>,
) -> Result<Json<Value>, AppError> {
    let company = company::update(&state.db, &handle, req).await?;
    Ok(Json(json!({ "company": company })))
}

/// DELETE /companies/:handle (admin only).
pub async fn handle_remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(handle): Path<String>,
) -> Result<Json<Value>, AppError> {
    company::remove(&state.db, &handle).await?;
    Ok(Json(json!({ "deleted": handle })))
}

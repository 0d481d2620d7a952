//! Company records: filter composition and CRUD accessors, keyed by handle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;
use crate::models::double_option;
use crate::sql::{sql_for_partial_update, SqlArg};

/// A company row. The handle is the stable human-readable identifier jobs
/// reference as their foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Payload for creating a company. The handle is caller-supplied, unlike job
/// ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Sparse PATCH payload. The handle is immutable; sending one is rejected as
/// an unknown field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
}

/// Optional search criteria for company listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

/// Composes the WHERE fragment for a company search. Same contract as the job
/// composer: fixed AND order (min employees, max employees, name), sequential
/// placeholders, `TRUE` when no criteria are supplied.
pub fn build_company_filter(filter: &CompanyFilter) -> Result<(String, Vec<SqlArg>), AppError> {
    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(AppError::BadRequest(
                "minEmployees cannot be greater than maxEmployees".to_string(),
            ));
        }
    }

    let mut predicates = Vec::new();
    let mut args = Vec::new();

    if let Some(min) = filter.min_employees {
        args.push(SqlArg::Int(Some(min)));
        predicates.push(format!("num_employees >= ${}", args.len()));
    }

    if let Some(max) = filter.max_employees {
        args.push(SqlArg::Int(Some(max)));
        predicates.push(format!("num_employees <= ${}", args.len()));
    }

    if let Some(name) = &filter.name {
        args.push(SqlArg::Text(Some(format!("%{name}%"))));
        predicates.push(format!("name ILIKE ${}", args.len()));
    }

    if predicates.is_empty() {
        return Ok(("TRUE".to_string(), args));
    }
    Ok((predicates.join(" AND "), args))
}

fn update_fields(data: CompanyUpdate) -> Vec<(&'static str, SqlArg)> {
    let mut fields = Vec::new();
    if let Some(name) = data.name {
        fields.push(("name", SqlArg::Text(Some(name))));
    }
    if let Some(description) = data.description {
        fields.push(("description", SqlArg::Text(Some(description))));
    }
    if let Some(num_employees) = data.num_employees {
        fields.push(("numEmployees", SqlArg::Int(num_employees)));
    }
    if let Some(logo_url) = data.logo_url {
        fields.push(("logoUrl", SqlArg::Text(logo_url)));
    }
    fields
}

/// Inserts a company. Handles are caller-chosen, so a duplicate is reported
/// as a `BadRequest` from an explicit pre-check rather than a raw constraint
/// violation.
pub async fn create(pool: &PgPool, company: NewCompany) -> Result<Company, AppError> {
    let duplicate: Option<(String,)> =
        sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
            .bind(&company.handle)
            .fetch_optional(pool)
            .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest(format!(
            "Duplicate company: {}",
            company.handle
        )));
    }

    let created = sqlx::query_as::<_, Company>(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING handle, name, description, num_employees, logo_url",
    )
    .bind(&company.handle)
    .bind(&company.name)
    .bind(&company.description)
    .bind(company.num_employees)
    .bind(&company.logo_url)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Lists companies matching `filter`, ordered by name ascending.
pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, AppError> {
    let (where_clause, args) = build_company_filter(filter)?;
    let sql = format!(
        "SELECT handle, name, description, num_employees, logo_url
         FROM companies
         WHERE {where_clause}
         ORDER BY name"
    );

    let mut query = sqlx::query_as::<_, Company>(&sql);
    for arg in args {
        query = query.bind(arg);
    }
    let companies = query.fetch_all(pool).await?;
    Ok(companies)
}

/// Fetches a single company by handle.
pub async fn get(pool: &PgPool, handle: &str) -> Result<Company, AppError> {
    sqlx::query_as::<_, Company>(
        "SELECT handle, name, description, num_employees, logo_url
         FROM companies
         WHERE handle = $1",
    )
    .bind(handle)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No company: {handle}")))
}

/// Applies a sparse update to a company and returns the full updated row.
pub async fn update(
    pool: &PgPool,
    handle: &str,
    data: CompanyUpdate,
) -> Result<Company, AppError> {
    let column_map = HashMap::from([
        ("numEmployees", "num_employees"),
        ("logoUrl", "logo_url"),
    ]);
    let set = sql_for_partial_update(update_fields(data), &column_map)?;

    let sql = format!(
        "UPDATE companies
         SET {}
         WHERE handle = ${}
         RETURNING handle, name, description, num_employees, logo_url",
        set.clause,
        set.args.len() + 1
    );

    let mut query = sqlx::query_as::<_, Company>(&sql);
    for arg in set.args {
        query = query.bind(arg);
    }
    query
        .bind(handle.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No company: {handle}")))
}

/// Deletes a company by handle. Jobs referencing it go with it (ON DELETE
/// CASCADE in the schema).
pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), AppError> {
    let deleted: Option<(String,)> =
        sqlx::query_as("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?;

    if deleted.is_none() {
        return Err(AppError::NotFound(format!("No company: {handle}")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

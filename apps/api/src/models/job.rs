//! Job records: filter composition and CRUD accessors.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;
use crate::models::double_option;
use crate::sql::{sql_for_partial_update, SqlArg};

/// A job row, serialized with the public camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Payload for creating a job. Unknown fields are rejected at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Sparse PATCH payload. Nullable columns use a double `Option` so that an
/// explicit `"salary": null` clears the column while an absent field leaves
/// it untouched. The id is not updatable; sending one is rejected as an
/// unknown field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub equity: Option<Option<Decimal>>,
    #[serde(default)]
    pub company_handle: Option<String>,
}

/// Optional search criteria for job listings. All members are independently
/// absent; an empty title fragment is a valid match-everything filter,
/// distinct from no title filter at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

/// Composes the WHERE fragment for a job search.
///
/// Criteria are ANDed in fixed order (salary, equity, title) with sequential
/// placeholders; with no criteria the fragment degrades to `TRUE`, so the
/// enclosing query never sees an empty clause or a dangling `AND`. Values are
/// always bound, never written into the query text.
pub fn build_job_filter(filter: &JobFilter) -> Result<(String, Vec<SqlArg>), AppError> {
    let mut predicates = Vec::new();
    let mut args = Vec::new();

    if let Some(min_salary) = filter.min_salary {
        if min_salary < 0 {
            return Err(AppError::BadRequest(
                "minSalary must be non-negative".to_string(),
            ));
        }
        args.push(SqlArg::Int(Some(min_salary)));
        predicates.push(format!("salary >= ${}", args.len()));
    }

    // Only an explicit true restricts; false and absent mean the same thing.
    if filter.has_equity == Some(true) {
        predicates.push("equity > 0".to_string());
    }

    if let Some(title) = &filter.title {
        args.push(SqlArg::Text(Some(format!("%{title}%"))));
        predicates.push(format!("title ILIKE ${}", args.len()));
    }

    if predicates.is_empty() {
        return Ok(("TRUE".to_string(), args));
    }
    Ok((predicates.join(" AND "), args))
}

/// Flattens a PATCH payload into `(public_name, value)` pairs in declaration
/// order, ready for the partial-update builder.
fn update_fields(data: JobUpdate) -> Vec<(&'static str, SqlArg)> {
    let mut fields = Vec::new();
    if let Some(title) = data.title {
        fields.push(("title", SqlArg::Text(Some(title))));
    }
    if let Some(salary) = data.salary {
        fields.push(("salary", SqlArg::Int(salary)));
    }
    if let Some(equity) = data.equity {
        fields.push(("equity", SqlArg::Numeric(equity)));
    }
    if let Some(handle) = data.company_handle {
        fields.push(("companyHandle", SqlArg::Text(Some(handle))));
    }
    fields
}

/// Inserts a job and returns it with the storage-assigned id. Uniqueness and
/// foreign-key violations surface as database errors, not local checks.
pub async fn create(pool: &PgPool, job: NewJob) -> Result<Job, AppError> {
    let created = sqlx::query_as::<_, Job>(
        "INSERT INTO jobs (title, salary, equity, company_handle)
         VALUES ($1, $2, $3, $4)
         RETURNING id, title, salary, equity, company_handle",
    )
    .bind(&job.title)
    .bind(job.salary)
    .bind(job.equity)
    .bind(&job.company_handle)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Lists jobs matching `filter`, ordered by title ascending. An empty match
/// is an empty list, never an error.
pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
    let (where_clause, args) = build_job_filter(filter)?;
    let sql = format!(
        "SELECT id, title, salary, equity, company_handle
         FROM jobs
         WHERE {where_clause}
         ORDER BY title"
    );

    let mut query = sqlx::query_as::<_, Job>(&sql);
    for arg in args {
        query = query.bind(arg);
    }
    let jobs = query.fetch_all(pool).await?;
    Ok(jobs)
}

/// Fetches a single job by id.
pub async fn get(pool: &PgPool, id: i32) -> Result<Job, AppError> {
    sqlx::query_as::<_, Job>(
        "SELECT id, title, salary, equity, company_handle
         FROM jobs
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No job with id: {id}")))
}

/// Applies a sparse update to a job and returns the full updated row.
/// Fails with `BadRequest` before touching storage when the payload resolves
/// to no fields.
pub async fn update(pool: &PgPool, id: i32, data: JobUpdate) -> Result<Job, AppError> {
    let column_map = HashMap::from([("companyHandle", "company_handle")]);
    let set = sql_for_partial_update(update_fields(data), &column_map)?;

    let sql = format!(
        "UPDATE jobs
         SET {}
         WHERE id = ${}
         RETURNING id, title, salary, equity, company_handle",
        set.clause,
        set.args.len() + 1
    );

    let mut query = sqlx::query_as::<_, Job>(&sql);
    for arg in set.args {
        query = query.bind(arg);
    }
    query
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No job with id: {id}")))
}

/// Deletes a job by id. Terminal: there is no soft-delete.
pub async fn remove(pool: &PgPool, id: i32) -> Result<(), AppError> {
    let deleted: Option<(i32,)> = sqlx::query_as("DELETE FROM jobs WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if deleted.is_none() {
        return Err(AppError::NotFound(format!("No job with id: {id}")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(
        title: Option<&str>,
        min_salary: Option<i32>,
        has_equity: Option<bool>,
    ) -> JobFilter {
        JobFilter {
            title: title.map(str::to_string),
            min_salary,
            has_equity,
        }
    }

    #[test]
    fn test_no_criteria_matches_all() {
        let (clause, args) = build_job_filter(&JobFilter::default()).unwrap();
        assert_eq!(clause, "TRUE");
        assert!(args.is_empty());
    }

    #[test]
    fn test_title_only() {
        let (clause, args) = build_job_filter(&filter(Some("j1"), None, None)).unwrap();
        assert_eq!(clause, "title ILIKE $1");
        assert_eq!(args, vec![SqlArg::Text(Some("%j1%".to_string()))]);
    }

    #[test]
    fn test_empty_title_is_a_real_filter() {
        // An empty fragment still produces a predicate; it just matches
        // everything with a non-null title.
        let (clause, args) = build_job_filter(&filter(Some(""), None, None)).unwrap();
        assert_eq!(clause, "title ILIKE $1");
        assert_eq!(args, vec![SqlArg::Text(Some("%%".to_string()))]);
    }

    #[test]
    fn test_min_salary_only() {
        let (clause, args) = build_job_filter(&filter(None, Some(60_000), None)).unwrap();
        assert_eq!(clause, "salary >= $1");
        assert_eq!(args, vec![SqlArg::Int(Some(60_000))]);
    }

    #[test]
    fn test_equity_only() {
        let (clause, args) = build_job_filter(&filter(None, None, Some(true))).unwrap();
        assert_eq!(clause, "equity > 0");
        assert!(args.is_empty());
    }

    #[test]
    fn test_has_equity_false_is_no_restriction() {
        let (clause, args) = build_job_filter(&filter(None, None, Some(false))).unwrap();
        assert_eq!(clause, "TRUE");
        assert!(args.is_empty());
    }

    #[test]
    fn test_salary_and_equity() {
        let (clause, args) = build_job_filter(&filter(None, Some(60_000), Some(true))).unwrap();
        assert_eq!(clause, "salary >= $1 AND equity > 0");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_all_criteria_in_fixed_order() {
        let (clause, args) =
            build_job_filter(&filter(Some("j"), Some(50_000), Some(true))).unwrap();
        assert_eq!(clause, "salary >= $1 AND equity > 0 AND title ILIKE $2");
        assert_eq!(
            args,
            vec![
                SqlArg::Int(Some(50_000)),
                SqlArg::Text(Some("%j%".to_string())),
            ]
        );
    }

    #[test]
    fn test_negative_min_salary_is_bad_request() {
        let err = build_job_filter(&filter(None, Some(-3), None)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_update_fields_declaration_order() {
        let data: JobUpdate = serde_json::from_str(
            r#"{"companyHandle": "c2", "title": "j1", "salary": 123000}"#,
        )
        .unwrap();
        let fields = update_fields(data);

        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["title", "salary", "companyHandle"]);
    }

    #[test]
    fn test_update_null_clears_vs_absent_skips() {
        let data: JobUpdate =
            serde_json::from_str(r#"{"salary": null, "equity": null}"#).unwrap();
        let fields = update_fields(data);

        assert_eq!(
            fields,
            vec![
                ("salary", SqlArg::Int(None)),
                ("equity", SqlArg::Numeric(None)),
            ]
        );
    }

    #[test]
    fn test_empty_update_resolves_to_no_fields() {
        let data: JobUpdate = serde_json::from_str("{}").unwrap();
        assert!(update_fields(data).is_empty());
    }

    #[test]
    fn test_update_rejects_id_field() {
        let result = serde_json::from_str::<JobUpdate>(r#"{"id": 10}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_job_rejects_unknown_fields() {
        let result = serde_json::from_str::<NewJob>(
            r#"{"title": "accountant", "companyHandle": "c1", "extraField": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_job_requires_title_and_handle() {
        assert!(serde_json::from_str::<NewJob>(r#"{"companyHandle": "c1"}"#).is_err());
        assert!(serde_json::from_str::<NewJob>(r#"{"title": "accountant"}"#).is_err());
    }

    #[test]
    fn test_equity_deserializes_from_number_or_string() {
        // Clients send equity both ways; the string form is exact.
        let from_number: NewJob = serde_json::from_str(
            r#"{"title": "accountant", "companyHandle": "c1", "equity": 0.08}"#,
        )
        .unwrap();
        let from_string: NewJob = serde_json::from_str(
            r#"{"title": "accountant", "companyHandle": "c1", "equity": "0.08"}"#,
        )
        .unwrap();

        assert!(from_number.equity.is_some());
        assert_eq!(from_string.equity.unwrap().to_string(), "0.08");
    }

    #[test]
    fn test_job_serializes_with_public_names() {
        let job = Job {
            id: 1,
            title: "j1".to_string(),
            salary: Some(123_000),
            equity: Some("0.55".parse().unwrap()),
            company_handle: "c1".to_string(),
        };
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["companyHandle"], "c1");
        assert_eq!(value["equity"], "0.55");
        assert!(value.get("company_handle").is_none());
    }
}

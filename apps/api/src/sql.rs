//! Dynamic SQL construction helpers shared by the resource accessors.
//!
//! Everything here produces query *text* with positional `$n` placeholders
//! plus a parallel list of typed bind values. Caller-supplied data is never
//! spliced into the text itself.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo};
use sqlx::{Postgres, Type};

use crate::errors::AppError;

/// A typed bind value for a dynamically built query.
///
/// Postgres needs a concrete type for every placeholder, NULLs included, so
/// each variant carries an `Option` of its column type instead of a separate
/// null marker.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(Option<String>),
    Int(Option<i32>),
    Numeric(Option<Decimal>),
    Bool(Option<bool>),
}

impl Type<Postgres> for SqlArg {
    fn type_info() -> PgTypeInfo {
        // Placeholder; the actual parameter type comes from `Encode::produces`.
        <String as Type<Postgres>>::type_info()
    }
}

/// `SqlArg` binds directly, so accessors can fold a heterogeneous value list
/// onto a query with a plain `query.bind(arg)` loop.
impl<'q> Encode<'q, Postgres> for SqlArg {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        match self {
            SqlArg::Text(v) => <Option<String> as Encode<'_, Postgres>>::encode_by_ref(v, buf),
            SqlArg::Int(v) => <Option<i32> as Encode<'_, Postgres>>::encode_by_ref(v, buf),
            SqlArg::Numeric(v) => <Option<Decimal> as Encode<'_, Postgres>>::encode_by_ref(v, buf),
            SqlArg::Bool(v) => <Option<bool> as Encode<'_, Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlArg::Text(_) => <String as Type<Postgres>>::type_info(),
            SqlArg::Int(_) => <i32 as Type<Postgres>>::type_info(),
            SqlArg::Numeric(_) => <Decimal as Type<Postgres>>::type_info(),
            SqlArg::Bool(_) => <bool as Type<Postgres>>::type_info(),
        })
    }
}

/// A parameterized `SET` clause plus its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub clause: String,
    pub args: Vec<SqlArg>,
}

/// Builds the `SET` clause of a partial UPDATE from a sparse field list.
///
/// Each `(public_name, value)` pair becomes `"<column>"=$n`, where the column
/// name comes from `column_map` when present and falls through unchanged
/// otherwise. Placeholders are numbered 1..N in input order with no gaps, and
/// `args` is the parallel value list for later binding.
///
/// An empty `fields` list is a caller error, not a no-op, and fails with
/// `BadRequest` before any storage round trip.
pub fn sql_for_partial_update(
    fields: Vec<(&str, SqlArg)>,
    column_map: &HashMap<&str, &str>,
) -> Result<SetClause, AppError> {
    if fields.is_empty() {
        return Err(AppError::BadRequest("No data to update".to_string()));
    }

    let mut assignments = Vec::with_capacity(fields.len());
    let mut args = Vec::with_capacity(fields.len());
    for (idx, (name, value)) in fields.into_iter().enumerate() {
        let column = column_map.get(name).copied().unwrap_or(name);
        assignments.push(format!("\"{}\"=${}", column, idx + 1));
        args.push(value);
    }

    Ok(SetClause {
        clause: assignments.join(", "),
        args,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &str) -> SqlArg {
        SqlArg::Text(Some(v.to_string()))
    }

    #[test]
    fn test_translates_mapped_columns() {
        let column_map = HashMap::from([("firstName", "first_name")]);
        let set = sql_for_partial_update(
            vec![("firstName", text("Aliya")), ("age", SqlArg::Int(Some(32)))],
            &column_map,
        )
        .unwrap();

        assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
        assert_eq!(set.args, vec![text("Aliya"), SqlArg::Int(Some(32))]);
    }

    #[test]
    fn test_identity_mapping_with_empty_column_map() {
        let set = sql_for_partial_update(
            vec![("firstName", text("Aliya")), ("age", SqlArg::Int(Some(32)))],
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(set.clause, r#""firstName"=$1, "age"=$2"#);
    }

    #[test]
    fn test_placeholders_are_sequential_without_gaps() {
        let set = sql_for_partial_update(
            vec![
                ("title", text("engineer")),
                ("salary", SqlArg::Int(Some(90_000))),
                ("equity", SqlArg::Numeric(None)),
                ("companyHandle", text("acme")),
            ],
            &HashMap::from([("companyHandle", "company_handle")]),
        )
        .unwrap();

        assert_eq!(
            set.clause,
            r#""title"=$1, "salary"=$2, "equity"=$3, "company_handle"=$4"#
        );
        assert_eq!(set.args.len(), 4);
    }

    #[test]
    fn test_null_values_keep_their_slot() {
        let set = sql_for_partial_update(
            vec![("salary", SqlArg::Int(None)), ("title", text("j1"))],
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(set.clause, r#""salary"=$1, "title"=$2"#);
        assert_eq!(set.args[0], SqlArg::Int(None));
    }

    #[test]
    fn test_empty_fields_is_bad_request() {
        let err = sql_for_partial_update(vec![], &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_unknown_map_entries_are_ignored() {
        let column_map = HashMap::from([("somethingElse", "something_else")]);
        let set = sql_for_partial_update(vec![("age", SqlArg::Int(Some(32)))], &column_map).unwrap();

        assert_eq!(set.clause, r#""age"=$1"#);
    }
}

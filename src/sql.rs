//! Parameterized SQL assembly: a query buffer for dynamically built
//! predicate/SET lists, and a bind-value enum the SQLite driver accepts.

use sqlx::encode::{Encode, IsNull};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteTypeInfo};
use sqlx::Database;

/// A value bound to a SQLite placeholder.
#[derive(Clone, Debug)]
pub enum SqlValue {
    Null,
    I64(i64),
    F64(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::I64(n)
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::F64(n)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl<'q> Encode<'q, Sqlite> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            SqlValue::Null => <Option<i64> as Encode<Sqlite>>::encode_by_ref(&None, buf)?,
            SqlValue::I64(n) => <i64 as Encode<Sqlite>>::encode_by_ref(n, buf)?,
            SqlValue::F64(n) => <f64 as Encode<Sqlite>>::encode_by_ref(n, buf)?,
            SqlValue::Text(s) => <String as Encode<Sqlite>>::encode_by_ref(s, buf)?,
        })
    }
}

impl sqlx::Type<Sqlite> for SqlValue {
    fn type_info() -> SqliteTypeInfo {
        <str as sqlx::Type<Sqlite>>::type_info()
    }
}

/// SQL string plus its ordered bind values. Placeholders are positional `?`;
/// parameters are pushed in placeholder order.
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    pub fn new(sql: impl Into<String>) -> Self {
        QueryBuf {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn push_param(&mut self, v: impl Into<SqlValue>) {
        self.params.push(v.into());
    }
}

/// Build an executable query from a buffer with every parameter bound.
pub fn query(buf: &QueryBuf) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut q = sqlx::query(&buf.sql);
    for p in &buf.params {
        q = q.bind(p.clone());
    }
    q
}

/// Comparison operator for a text predicate: `LIKE` when the value carries
/// either reserved wildcard (`_` or `%`), plain equality otherwise.
pub fn match_operator(value: &str) -> &'static str {
    if value.contains(['_', '%']) {
        "LIKE"
    } else {
        "="
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_selection() {
        assert_eq!(match_operator("Tokyo"), "=");
        assert_eq!(match_operator("%yok%"), "LIKE");
        assert_eq!(match_operator("T_kyo"), "LIKE");
        assert_eq!(match_operator(""), "=");
    }

    #[test]
    fn option_becomes_null() {
        let none: Option<i64> = None;
        assert!(matches!(SqlValue::from(none), SqlValue::Null));
        assert!(matches!(SqlValue::from(Some(7i64)), SqlValue::I64(7)));
    }
}

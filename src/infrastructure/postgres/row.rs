//! Statement parameters and decoded result sets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgColumn, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as _, TypeInfo};

use super::DatabaseError;

/// A bind parameter for [`QueryExecutor::query`](super::QueryExecutor::query).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Bound as a NULL `TEXT`
    Null,
    Int(i32),
    Text(String),
}

impl SqlValue {
    pub(crate) fn bind<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
        }
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// One result row: column name to JSON value.
///
/// Timestamps are rendered as RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Deserialize the row into a typed record.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, DatabaseError> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }

    pub(crate) fn decode(row: &PgRow) -> Result<Self, DatabaseError> {
        let mut map = Map::with_capacity(row.len());
        for column in row.columns() {
            map.insert(column.name().to_string(), decode_column(row, column)?);
        }
        Ok(Row(map))
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Row(map)
    }
}

/// Rows returned by a statement plus the server-reported row count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    /// Rows returned or affected, as reported in the command tag
    pub row_count: u64,
}

impl QueryResult {
    pub fn into_first(self) -> Option<Row> {
        self.rows.into_iter().next()
    }

    /// Deserialize every row into `T`.
    pub fn deserialize_all<T: DeserializeOwned>(self) -> Result<Vec<T>, DatabaseError> {
        self.rows.into_iter().map(Row::deserialize).collect()
    }
}

fn decode_column(row: &PgRow, column: &PgColumn) -> Result<Value, DatabaseError> {
    let idx = column.ordinal();
    let type_name = column.type_info().name();

    let value = match type_name {
        "BOOL" => get::<bool>(row, idx)?.map(Value::from),
        "INT2" => get::<i16>(row, idx)?.map(Value::from),
        "INT4" => get::<i32>(row, idx)?.map(Value::from),
        "INT8" => get::<i64>(row, idx)?.map(Value::from),
        "FLOAT4" => get::<f32>(row, idx)?.map(|v| Value::from(f64::from(v))),
        "FLOAT8" => get::<f64>(row, idx)?.map(Value::from),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => get::<String>(row, idx)?.map(Value::from),
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, idx)?
            .map(|v| Value::from(v.to_rfc3339_opts(SecondsFormat::Micros, true))),
        "TIMESTAMP" => get::<NaiveDateTime>(row, idx)?
            .map(|v| Value::from(v.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())),
        "DATE" => get::<NaiveDate>(row, idx)?.map(|v| Value::from(v.to_string())),
        "JSON" | "JSONB" => get::<Value>(row, idx)?,
        "VOID" => None,
        other => {
            return Err(DatabaseError::UnsupportedColumn {
                column: column.name().to_string(),
                type_name: other.to_string(),
            })
        }
    };

    Ok(value.unwrap_or(Value::Null))
}

fn get<'r, T>(row: &'r PgRow, idx: usize) -> Result<Option<T>, DatabaseError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(idx)
        .map_err(DatabaseError::Statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        id: i32,
        title: String,
        created_at: DateTime<Utc>,
    }

    fn sample_row() -> Row {
        match json!({
            "id": 7,
            "title": "Test Entry 1",
            "created_at": "2024-03-01T12:30:00.123456Z",
        }) {
            Value::Object(map) => Row::from(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_row_deserializes_into_record() {
        let sample: Sample = sample_row().deserialize().unwrap();
        assert_eq!(sample.id, 7);
        assert_eq!(sample.title, "Test Entry 1");
        assert_eq!(sample.created_at.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn test_row_deserialize_reports_missing_column() {
        let mut map = sample_row().into_map();
        map.remove("title");
        let err = Row::from(map).deserialize::<Sample>().unwrap_err();
        assert!(matches!(err, DatabaseError::RowMapping(_)));
    }

    #[test]
    fn test_row_accessors() {
        let row = sample_row();
        assert_eq!(row.get("id"), Some(&json!(7)));
        assert!(row.get("missing").is_none());
        assert_eq!(row.into_map().len(), 3);
    }

    #[test]
    fn test_query_result_helpers() {
        let result = QueryResult {
            rows: vec![sample_row()],
            row_count: 1,
        };
        assert_eq!(result.rows[0].get("id"), Some(&json!(7)));

        let samples: Vec<Sample> = result.deserialize_all().unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_sql_value_conversions() {
        assert_eq!(SqlValue::from(3_i32), SqlValue::Int(3));
        assert_eq!(SqlValue::from("hi"), SqlValue::Text("hi".into()));
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(5_i32)), SqlValue::Int(5));
    }
}

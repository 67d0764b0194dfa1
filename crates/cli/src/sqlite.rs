use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use sqlbench_eval::{EvalError, QueryRunner, Row, Value};

/// Runs benchmark queries against a read-only SQLite database.
pub struct SqliteRunner {
    connection: Connection,
}

impl SqliteRunner {
    pub fn open(path: &Path) -> Result<Self> {
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }
}

impl QueryRunner for SqliteRunner {
    fn run(&self, sql: &str) -> Result<Vec<Row>, EvalError> {
        let mut statement = self.connection.prepare(sql).map_err(query_error)?;
        let width = statement.column_count();
        let mut rows = statement.query([]).map_err(query_error)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get::<usize, SqlValue>(index).map_err(query_error)?;
                values.push(to_value(value));
            }
            out.push(values);
        }
        Ok(out)
    }
}

fn to_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(i),
        SqlValue::Real(r) => Value::Real(r),
        SqlValue::Text(text) => Value::Text(text),
        SqlValue::Blob(bytes) => Value::Blob(bytes),
    }
}

fn query_error(err: rusqlite::Error) -> EvalError {
    EvalError::Query(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> SqliteRunner {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name TEXT, Rating REAL, Photo BLOB);
                 INSERT INTO Artist VALUES (1, 'AC/DC', 4.5, x'0102');
                 INSERT INTO Artist VALUES (2, 'Accept', NULL, NULL);",
            )
            .unwrap();
        SqliteRunner::from_connection(connection)
    }

    #[test]
    fn maps_storage_classes() {
        let rows = runner().run("SELECT * FROM Artist ORDER BY ArtistId").unwrap();
        assert_eq!(
            rows[0],
            vec![
                Value::Integer(1),
                Value::from("AC/DC"),
                Value::Real(4.5),
                Value::Blob(vec![1, 2])
            ]
        );
        assert_eq!(rows[1][2], Value::Null);
    }

    #[test]
    fn empty_result_has_no_rows() {
        let rows = runner().run("SELECT Name FROM Artist WHERE ArtistId > 99").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn bad_sql_is_a_query_error() {
        let err = runner().run("SELECT * FROM Nope").unwrap_err();
        assert!(matches!(err, EvalError::Query(msg) if msg.contains("Nope")));
    }
}

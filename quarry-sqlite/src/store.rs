use crate::RowsCursor;
use quarry_core::{
    Connection, Cursor, Error, Result, Store, Value, separated_by, write_identifier,
};
use rusqlite::types::ValueRef;
use std::path::Path;

/// An embedded SQLite database.
///
/// Wraps a single `rusqlite` connection and serves it for both reads and
/// writes, which is how SQLite itself is meant to be used in-process.
///
/// Foreign key enforcement is left at SQLite's default (off): the generated
/// `FOREIGN KEY` clauses are declarative, and a join default may reference a
/// row that was never stored.
pub struct SqliteStore {
    conn: rusqlite::Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path).map_err(storage)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(storage)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    type Conn = SqliteStore;

    fn readable(&self) -> Result<&SqliteStore> {
        Ok(self)
    }

    fn writable(&self) -> Result<&SqliteStore> {
        Ok(self)
    }
}

impl Connection for SqliteStore {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn Cursor>> {
        log::trace!("sqlite query: {}", sql);
        let mut statement = self.conn.prepare(sql).map_err(storage)?;
        let columns = statement
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        let binds = args.iter().map(bind).collect::<Result<Vec<_>>>()?;
        let mut rows = statement
            .query(rusqlite::params_from_iter(binds))
            .map_err(storage)?;
        let mut buffered = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(extract(row.get_ref(i).map_err(storage)?));
            }
            buffered.push(values);
        }
        Ok(Box::new(RowsCursor::new(columns, buffered)))
    }

    fn insert(&self, table: &str, values: &[(&str, Value)]) -> Result<i64> {
        let mut sql = String::from("INSERT INTO ");
        write_identifier(&mut sql, table);
        if values.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            sql.push_str(" (");
            separated_by(
                &mut sql,
                values,
                |out, value: &(&str, Value)| write_identifier(out, value.0),
                ", ",
            );
            sql.push_str(") VALUES (");
            separated_by(&mut sql, values, |out, _| out.push('?'), ", ");
            sql.push(')');
        }
        log::trace!("sqlite insert: {}", sql);
        let binds = values
            .iter()
            .map(|(_, value)| bind(value))
            .collect::<Result<Vec<_>>>()?;
        self.conn
            .execute(&sql, rusqlite::params_from_iter(binds))
            .map_err(storage)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(
        &self,
        table: &str,
        values: &[(&str, Value)],
        where_clause: &str,
        args: &[Value],
    ) -> Result<u64> {
        let mut sql = String::from("UPDATE ");
        write_identifier(&mut sql, table);
        sql.push_str(" SET ");
        separated_by(
            &mut sql,
            values,
            |out, value: &(&str, Value)| {
                write_identifier(out, value.0);
                out.push_str(" = ?");
            },
            ", ",
        );
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        log::trace!("sqlite update: {}", sql);
        let binds = values
            .iter()
            .map(|(_, value)| bind(value))
            .chain(args.iter().map(bind))
            .collect::<Result<Vec<_>>>()?;
        let count = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(binds))
            .map_err(storage)?;
        Ok(count as u64)
    }

    fn delete(&self, table: &str, where_clause: &str, args: &[Value]) -> Result<u64> {
        let mut sql = String::from("DELETE FROM ");
        write_identifier(&mut sql, table);
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        log::trace!("sqlite delete: {}", sql);
        let binds = args.iter().map(bind).collect::<Result<Vec<_>>>()?;
        let count = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(binds))
            .map_err(storage)?;
        Ok(count as u64)
    }

    fn execute(&self, sql: &str) -> Result<()> {
        log::trace!("sqlite execute: {}", sql);
        self.conn.execute_batch(sql).map_err(storage)
    }
}

fn storage(error: rusqlite::Error) -> Error {
    Error::storage(error.to_string())
}

fn bind(value: &Value) -> Result<rusqlite::types::Value> {
    use rusqlite::types::Value as Sql;
    Ok(match value {
        v if v.is_null() => Sql::Null,
        Value::Boolean(Some(v)) => Sql::Integer(*v as i64),
        Value::Int16(Some(v)) => Sql::Integer(*v as i64),
        Value::Int32(Some(v)) => Sql::Integer(*v as i64),
        Value::Int64(Some(v)) => Sql::Integer(*v),
        Value::Float32(Some(v)) => Sql::Real(*v as f64),
        Value::Float64(Some(v)) => Sql::Real(*v),
        Value::Text(Some(v)) => Sql::Text(v.clone()),
        Value::Blob(Some(v)) => Sql::Blob(v.to_vec()),
        _ => unreachable!(),
    })
}

fn extract(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int64(Some(v)),
        ValueRef::Real(v) => Value::Float64(Some(v)),
        ValueRef::Text(v) => Value::Text(Some(String::from_utf8_lossy(v).into_owned())),
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    }
}

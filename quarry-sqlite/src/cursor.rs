use quarry_core::{Cursor, Error, Result, Value};

/// Cursor over a fully materialized result set.
///
/// SQLite statements borrow their connection, so the rows are buffered up
/// front; that keeps the cursor free of the statement's lifetime and lets
/// the driver reuse the connection for join resolution mid-scan.
pub struct RowsCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    next: usize,
}

impl RowsCursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            next: 0,
        }
    }

    fn current(&self) -> Result<&[Value]> {
        if self.next == 0 {
            return Err(Error::storage("cursor is not positioned on a row"));
        }
        self.rows
            .get(self.next - 1)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::storage("cursor ran past the last row"))
    }

    fn value(&self, index: usize) -> Result<&Value> {
        self.current()?
            .get(index)
            .ok_or_else(|| Error::storage(format!("column index {} is out of range", index)))
    }
}

impl Cursor for RowsCursor {
    fn advance(&mut self) -> Result<bool> {
        if self.next < self.rows.len() {
            self.next += 1;
            Ok(true)
        } else {
            self.next = self.rows.len() + 1;
            Ok(false)
        }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    fn is_null(&self, index: usize) -> bool {
        self.value(index).map(Value::is_null).unwrap_or(true)
    }

    fn get_i64(&self, index: usize) -> Result<i64> {
        let value = self.value(index)?;
        value
            .as_i64()
            .ok_or_else(|| Error::storage(format!("cannot read {:?} as an integer", value)))
    }

    fn get_f64(&self, index: usize) -> Result<f64> {
        match self.value(index)? {
            Value::Float64(Some(v)) => Ok(*v),
            other => match other.as_i64() {
                Some(v) => Ok(v as f64),
                None => Err(Error::storage(format!("cannot read {:?} as a real", other))),
            },
        }
    }

    fn get_text(&self, index: usize) -> Result<String> {
        match self.value(index)? {
            Value::Text(Some(v)) => Ok(v.clone()),
            other => Err(Error::storage(format!("cannot read {:?} as text", other))),
        }
    }

    fn get_blob(&self, index: usize) -> Result<Vec<u8>> {
        match self.value(index)? {
            Value::Blob(Some(v)) => Ok(v.to_vec()),
            other => Err(Error::storage(format!("cannot read {:?} as a blob", other))),
        }
    }
}

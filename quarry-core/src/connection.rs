use crate::{Result, Value};

/// Handle to an embedded database, dispensing connections for reads and
/// writes. Embedded engines typically hand back the same connection for
/// both.
pub trait Store {
    type Conn: Connection;

    fn readable(&self) -> Result<&Self::Conn>;
    fn writable(&self) -> Result<&Self::Conn>;
}

/// A live connection executing parameterized statements.
///
/// The write operations take pre-rendered table and clause fragments so the
/// backend stays a thin adapter; all identifier quoting and placeholder
/// layout happens upstream.
pub trait Connection {
    /// Run a SELECT with positional `?` placeholders bound to `args`.
    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn Cursor>>;

    /// Insert one row and return the key the engine assigned to it. The
    /// `values` slice may be empty, in which case every column takes its
    /// declared default.
    fn insert(&self, table: &str, values: &[(&str, Value)]) -> Result<i64>;

    /// Apply a SET list to the rows matching `where_clause`, returning the
    /// affected-row count. `args` binds the SET placeholders first, then the
    /// WHERE placeholders.
    fn update(
        &self,
        table: &str,
        values: &[(&str, Value)],
        where_clause: &str,
        args: &[Value],
    ) -> Result<u64>;

    /// Delete the rows matching `where_clause`, returning the affected-row
    /// count.
    fn delete(&self, table: &str, where_clause: &str, args: &[Value]) -> Result<u64>;

    /// Run a statement that produces no rows, as-is.
    fn execute(&self, sql: &str) -> Result<()>;
}

/// Forward-only scan over a query result.
///
/// Starts positioned before the first row; `advance` moves onto the next
/// row and reports whether one exists.
pub trait Cursor {
    fn advance(&mut self) -> Result<bool>;

    /// Position of a column in the current result shape, by name.
    fn column_index(&self, name: &str) -> Option<usize>;

    fn is_null(&self, index: usize) -> bool;
    fn get_i64(&self, index: usize) -> Result<i64>;
    fn get_f64(&self, index: usize) -> Result<f64>;
    fn get_text(&self, index: usize) -> Result<String>;
    fn get_blob(&self, index: usize) -> Result<Vec<u8>>;
}

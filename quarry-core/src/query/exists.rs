use crate::{Connection, Error, ParsedQuery, Result, TableDef, Value, predicate, write_identifier};

/// Report whether any row matches the predicate, via `SELECT COUNT(*)`.
pub fn exists(
    conn: &impl Connection,
    def: &TableDef,
    parsed: &ParsedQuery,
    args: &[Value],
) -> Result<bool> {
    let predicate = predicate::compile(parsed, def)?;
    let args = predicate::coerce_args(parsed, args)?;
    let mut sql = String::from("SELECT COUNT(*) FROM ");
    write_identifier(&mut sql, def.name);
    predicate.write_to(&mut sql);
    log::debug!("query: {}", sql);
    let mut cursor = conn.query(&sql, &args)?;
    if !cursor.advance()? {
        return Err(Error::storage("count query produced no row"));
    }
    Ok(cursor.get_i64(0)? > 0)
}

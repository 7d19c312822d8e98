use crate::{Connection, ParsedQuery, Result, TableDef, Value, predicate};

/// Delete every row matching the predicate, returning the affected-row
/// count.
pub fn delete(
    conn: &impl Connection,
    def: &TableDef,
    parsed: &ParsedQuery,
    args: &[Value],
) -> Result<u64> {
    let predicate = predicate::compile(parsed, def)?;
    let args = predicate::coerce_args(parsed, args)?;
    log::debug!("deleting from '{}' where {}", def.name, predicate.where_clause);
    conn.delete(def.name, &predicate.where_clause, &args)
}

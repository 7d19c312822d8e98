use crate::{Connection, Error, ParsedQuery, Result, TableDef, Value, predicate};

/// Apply a field→value map to every row matching the predicate, returning
/// the affected-row count.
///
/// The map is keyed by entity field names and resolved to physical columns
/// here; an empty map is a syntax error since the statement would have no
/// SET list.
pub fn update(
    conn: &impl Connection,
    def: &TableDef,
    parsed: &ParsedQuery,
    values: &[(&str, Value)],
    args: &[Value],
) -> Result<u64> {
    if values.is_empty() {
        return Err(Error::syntax("update requires at least one value to set"));
    }
    let mut assignments: Vec<(&str, Value)> = Vec::with_capacity(values.len());
    for (field, value) in values {
        let column = def
            .column_for_token(field)
            .ok_or_else(|| Error::FieldNotFound((*field).to_owned()))?;
        assignments.push((column, predicate::coerce_arg(value)?));
    }
    let predicate = predicate::compile(parsed, def)?;
    let args = predicate::coerce_args(parsed, args)?;
    log::debug!(
        "updating '{}' where {} ({} assignment(s))",
        def.name,
        predicate.where_clause,
        assignments.len()
    );
    conn.update(def.name, &assignments, &predicate.where_clause, &args)
}

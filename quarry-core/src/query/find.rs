use crate::{
    Connection, ParsedQuery, Record, Result, TableDef, Value,
    join::{record_from_row, resolve_joins},
    predicate, write_identifier,
};

/// Run a find-family query and hydrate every matching row.
pub fn find(
    conn: &impl Connection,
    def: &TableDef,
    parsed: &ParsedQuery,
    args: &[Value],
) -> Result<Vec<Record>> {
    let predicate = predicate::compile(parsed, def)?;
    let args = predicate::coerce_args(parsed, args)?;
    let mut sql = String::from("SELECT * FROM ");
    write_identifier(&mut sql, def.name);
    predicate.write_to(&mut sql);
    rows(conn, def, &sql, &args)
}

/// Run an arbitrary SELECT and map its rows through the entity metadata,
/// joins included.
pub fn rows(
    conn: &impl Connection,
    def: &TableDef,
    sql: &str,
    args: &[Value],
) -> Result<Vec<Record>> {
    log::debug!("query: {}", sql);
    let mut cursor = conn.query(sql, args)?;
    let mut records = Vec::new();
    while cursor.advance()? {
        let mut record = record_from_row(def, cursor.as_mut())?;
        resolve_joins(conn, def, &mut record)?;
        records.push(record);
    }
    Ok(records)
}

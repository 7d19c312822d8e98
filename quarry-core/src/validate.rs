use crate::{
    Connection, Error, Record, Result, TableDef, Value, join::foreign_key,
    predicate::coerce_arg, write_identifier,
};

/// Check a record against the nullability and uniqueness constraints of its
/// metadata.
///
/// All fields are inspected before reporting, so the caller receives every
/// violation at once rather than the first one hit. Autoincrement keys are
/// exempt from the null check since the engine assigns them on insert.
pub fn validate(conn: &impl Connection, def: &TableDef, record: &Record) -> Result<()> {
    let mut violations = Vec::new();
    for column in def.columns {
        if column.auto_increment {
            continue;
        }
        let value = record.get(column.field);
        let null = value.is_none_or(Value::is_null);
        if null && !column.nullable && column.default.is_none() {
            violations.push(format!("Field '{}' cannot be null", column.field));
        }
        if column.unique && !null {
            let value = value.cloned().unwrap_or_default();
            if value_exists(conn, def.name, column.name, &value)? {
                violations.push(format!(
                    "Field '{}' must be unique. Value '{}' already exists",
                    column.field, value
                ));
            }
        }
    }
    for join in def.joins {
        let key = foreign_key(def, join, record);
        let null = key.is_none_or(Value::is_null);
        if null && record.relation(join.field).is_none() {
            if !join.nullable && join.default.is_none() {
                violations.push(format!("Join field '{}' cannot be null", join.field));
            }
            continue;
        }
        if join.unique && !null {
            let key = key.cloned().unwrap_or_default();
            if value_exists(conn, def.name, join.target_column, &key)? {
                violations.push(format!(
                    "Join field '{}' must be unique. Value '{}' already exists",
                    join.field, key
                ));
            }
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(violations))
    }
}

fn value_exists(
    conn: &impl Connection,
    table: &str,
    column: &str,
    value: &Value,
) -> Result<bool> {
    let mut sql = String::from("SELECT COUNT(*) FROM ");
    write_identifier(&mut sql, table);
    sql.push_str(" WHERE ");
    write_identifier(&mut sql, column);
    sql.push_str(" = ?");
    let mut cursor = conn.query(&sql, &[coerce_arg(value)?])?;
    Ok(cursor.advance()? && cursor.get_i64(0)? > 0)
}

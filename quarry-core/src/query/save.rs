use crate::{Connection, Record, Result, SqlType, TableDef, Value, validate::validate};

/// Persist a record: settle its relation fields, validate, insert, and hand
/// back the record with any engine-assigned key filled in.
///
/// Fields holding NULL are left out of the insert so declared column
/// defaults apply, and an unassigned autoincrement key is left out so the
/// engine picks one. Related records whose key field is an unassigned
/// autoincrement primary key are saved first and lend their fresh key to
/// the owning row.
pub fn save(conn: &impl Connection, def: &TableDef, mut record: Record) -> Result<Record> {
    settle_joins(conn, def, &mut record)?;
    validate(conn, def, &record)?;
    let mut values: Vec<(&str, Value)> = Vec::new();
    for column in def.columns {
        let Some(value) = record.get(column.field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if column.auto_increment && value.is_unset() {
            continue;
        }
        values.push((column.name, value.clone()));
    }
    for join in def.joins {
        if def.column_by_name(join.target_column).is_some() {
            continue;
        }
        if let Some(key) = record.get(join.field) {
            if !key.is_null() {
                values.push((join.target_column, key.clone()));
            }
        }
    }
    log::debug!("inserting into '{}' ({} value(s))", def.name, values.len());
    let rowid = conn.insert(def.name, &values)?;
    if let Some(pk) = def.primary_key() {
        let unset = record.get(pk.field).is_none_or(Value::is_unset);
        if pk.auto_increment && unset {
            match pk.ty {
                SqlType::Integer => record.set(pk.field, rowid as i32),
                _ => record.set(pk.field, rowid),
            };
        }
    }
    Ok(record)
}

/// Bring each relation field and its stored foreign key in line before the
/// insert. A related record still missing its autoincrement key is saved
/// first; afterwards the source field's value is copied into the owning
/// record's key slot.
fn settle_joins(conn: &impl Connection, def: &TableDef, record: &mut Record) -> Result<()> {
    for join in def.joins {
        let Some(related_record) = record.relation(join.field).cloned() else {
            continue;
        };
        let source = join.source_column()?;
        let related_def = (join.related)();
        let unsaved = source.auto_increment
            && related_record
                .get(source.field)
                .is_none_or(Value::is_unset);
        let related_record = if unsaved {
            let saved = save(conn, related_def, related_record)?;
            record.set_relation(join.field, saved.clone());
            saved
        } else {
            related_record
        };
        if let Some(key) = related_record.get(source.field) {
            let slot = match def.column_by_name(join.target_column) {
                Some(column) => column.field,
                None => join.field,
            };
            record.set(slot, key.clone());
        }
    }
    Ok(())
}

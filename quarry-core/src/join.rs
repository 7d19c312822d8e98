use crate::{
    ColumnDef, Connection, Cursor, Error, JoinDef, Record, Result, SqlType, TableDef, Value,
    predicate::coerce_arg, write_identifier,
};

/// Hydrate the relation fields of a freshly mapped record.
///
/// For each join the stored foreign key is looked up in the related table
/// and the first matching row becomes a nested record; related rows are
/// mapped one level deep, their own joins stay cold. An absent key with a
/// declared default produces a placeholder stub carrying only the parsed
/// default in the source field; an absent key without one simply leaves the
/// relation unset.
pub fn resolve_joins(conn: &impl Connection, def: &TableDef, record: &mut Record) -> Result<()> {
    for join in def.joins {
        let key = match foreign_key(def, join, record) {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                if let Some(default) = join.default {
                    record.set_relation(join.field, stub_record(join, default)?);
                }
                continue;
            }
        };
        let related = (join.related)();
        let source = join.source_column()?;
        let mut sql = String::from("SELECT * FROM ");
        write_identifier(&mut sql, related.name);
        sql.push_str(" WHERE ");
        write_identifier(&mut sql, source.name);
        sql.push_str(" = ?");
        log::debug!("resolving join '{}': {}", join.field, sql);
        let mut cursor = conn.query(&sql, &[coerce_arg(&key)?])?;
        if cursor.advance()? {
            record.set_relation(join.field, record_from_row(related, cursor.as_mut())?);
        }
    }
    Ok(())
}

/// The stored foreign-key value of a join: the declared column sharing the
/// target name when one exists, otherwise the slot stashed under the join
/// field during row mapping.
pub fn foreign_key<'a>(
    def: &TableDef,
    join: &JoinDef,
    record: &'a Record,
) -> Option<&'a Value> {
    match def.column_by_name(join.target_column) {
        Some(column) => record.get(column.field),
        None => record.get(join.field),
    }
}

/// Placeholder for a related row that was never stored: only the source
/// field carries a value, the parsed default key.
fn stub_record(join: &JoinDef, default: &str) -> Result<Record> {
    let source = join.source_column()?;
    let mut record = Record::new();
    record.set(source.field, parse_literal(source, default)?);
    Ok(record)
}

fn parse_literal(column: &ColumnDef, literal: &str) -> Result<Value> {
    let invalid = || {
        Error::schema(format!(
            "default value '{}' is invalid for {} column '{}'",
            literal,
            column.ty.sql_keyword(),
            column.name
        ))
    };
    Ok(match column.ty {
        SqlType::Text => Value::Text(Some(literal.to_owned())),
        SqlType::Integer => Value::Int32(Some(literal.parse().map_err(|_| invalid())?)),
        SqlType::BigInt | SqlType::Timestamp => {
            Value::Int64(Some(literal.parse().map_err(|_| invalid())?))
        }
        SqlType::Real => Value::Float64(Some(literal.parse().map_err(|_| invalid())?)),
        SqlType::Boolean => match literal {
            "true" | "1" => Value::Boolean(Some(true)),
            "false" | "0" => Value::Boolean(Some(false)),
            _ => return Err(invalid()),
        },
        SqlType::Blob => return Err(invalid()),
    })
}

/// Map the cursor's current row into a record following the table metadata.
///
/// Columns absent from the result shape stay absent from the record.
/// Foreign-key columns that have no declared column of their own land under
/// the join field name so the resolver can find them later.
pub fn record_from_row(def: &TableDef, cursor: &mut dyn Cursor) -> Result<Record> {
    let mut record = Record::new();
    for column in def.columns {
        if let Some(index) = cursor.column_index(column.name) {
            record.set(column.field, read_typed(cursor, index, column.ty)?);
        }
    }
    for join in def.joins {
        if def.column_by_name(join.target_column).is_some() {
            continue;
        }
        if let Some(index) = cursor.column_index(join.target_column) {
            let ty = join.source_column()?.ty;
            record.set(join.field, read_typed(cursor, index, ty)?);
        }
    }
    Ok(record)
}

fn read_typed(cursor: &dyn Cursor, index: usize, ty: SqlType) -> Result<Value> {
    if cursor.is_null(index) {
        return Ok(match ty {
            SqlType::Text => Value::Text(None),
            SqlType::Integer => Value::Int32(None),
            SqlType::BigInt | SqlType::Timestamp => Value::Int64(None),
            SqlType::Real => Value::Float64(None),
            SqlType::Boolean => Value::Boolean(None),
            SqlType::Blob => Value::Blob(None),
        });
    }
    Ok(match ty {
        SqlType::Text => Value::Text(Some(cursor.get_text(index)?)),
        SqlType::Integer => Value::Int32(Some(cursor.get_i64(index)? as i32)),
        SqlType::BigInt | SqlType::Timestamp => Value::Int64(Some(cursor.get_i64(index)?)),
        SqlType::Real => Value::Float64(Some(cursor.get_f64(index)?)),
        SqlType::Boolean => Value::Boolean(Some(cursor.get_i64(index)? != 0)),
        SqlType::Blob => Value::Blob(Some(cursor.get_blob(index)?.into_boxed_slice())),
    })
}

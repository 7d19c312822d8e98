use crate::{Error, Result, SqlType, TableDef, value::write_quoted, write_identifier};

/// Synthesize the DDL for one entity table.
///
/// Plain columns and join foreign-key columns are grouped by physical name;
/// when a join shares its target column with a declared column, the declared
/// column drives the definition and the uniqueness flags are combined. The
/// statement is idempotent, so repositories can run it on every open.
pub fn create_table_sql(def: &TableDef) -> Result<String> {
    def.check()?;
    let mut physical: Vec<Physical> = Vec::with_capacity(def.columns.len() + def.joins.len());
    for column in def.columns {
        physical.push(Physical {
            name: column.name,
            ty: column.ty,
            nullable: column.nullable,
            unique: column.unique,
            primary_key: column.primary_key,
            auto_increment: column.auto_increment,
            default: column.default,
        });
    }
    for join in def.joins {
        let source = join.source_column()?;
        match physical.iter_mut().find(|p| p.name == join.target_column) {
            Some(existing) => existing.unique |= join.unique,
            None => physical.push(Physical {
                name: join.target_column,
                ty: source.ty,
                nullable: join.nullable,
                unique: join.unique,
                primary_key: false,
                auto_increment: false,
                default: join.default,
            }),
        }
    }
    let mut out = String::from("CREATE TABLE IF NOT EXISTS ");
    write_identifier(&mut out, def.name);
    out.push_str(" (");
    for (i, column) in physical.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_column(&mut out, column)?;
    }
    for join in def.joins {
        let related = (join.related)();
        out.push_str(", FOREIGN KEY (");
        write_identifier(&mut out, join.target_column);
        out.push_str(") REFERENCES ");
        write_identifier(&mut out, related.name);
        out.push_str(" (");
        write_identifier(&mut out, join.source_column()?.name);
        out.push(')');
    }
    out.push_str(");");
    Ok(out)
}

struct Physical {
    name: &'static str,
    ty: SqlType,
    nullable: bool,
    unique: bool,
    primary_key: bool,
    auto_increment: bool,
    default: Option<&'static str>,
}

fn write_column(out: &mut String, column: &Physical) -> Result<()> {
    write_identifier(out, column.name);
    out.push(' ');
    out.push_str(column.ty.sql_keyword());
    if !column.nullable {
        out.push_str(" NOT NULL");
    }
    if column.primary_key {
        out.push_str(" PRIMARY KEY");
    }
    if column.auto_increment {
        out.push_str(" AUTOINCREMENT");
    }
    if column.unique && !column.primary_key {
        out.push_str(" UNIQUE");
    }
    if let Some(default) = column.default {
        out.push_str(" DEFAULT ");
        write_default(out, column, default)?;
    }
    Ok(())
}

/// Validate the declared default against the column type and append its SQL
/// literal form.
fn write_default(out: &mut String, column: &Physical, default: &str) -> Result<()> {
    match column.ty {
        SqlType::Text => write_quoted(out, default),
        SqlType::Integer | SqlType::BigInt | SqlType::Timestamp => {
            default.parse::<i64>().map_err(|_| invalid(column, default))?;
            out.push_str(default);
        }
        SqlType::Real => {
            default.parse::<f64>().map_err(|_| invalid(column, default))?;
            out.push_str(default);
        }
        SqlType::Boolean => match default {
            "true" | "1" => out.push('1'),
            "false" | "0" => out.push('0'),
            _ => return Err(invalid(column, default)),
        },
        SqlType::Blob => return Err(invalid(column, default)),
    }
    Ok(())
}

fn invalid(column: &Physical, default: &str) -> Error {
    Error::schema(format!(
        "default value '{}' is invalid for {} column '{}'",
        default,
        column.ty.sql_keyword(),
        column.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDef, JoinDef};

    static LINE: TableDef = TableDef {
        name: "lines",
        columns: &[
            ColumnDef {
                field: "id",
                name: "id",
                nullable: false,
                primary_key: true,
                auto_increment: true,
                ..ColumnDef::BASE
            },
            ColumnDef {
                field: "name",
                name: "name",
                ty: SqlType::Text,
                nullable: false,
                ..ColumnDef::BASE
            },
        ],
        joins: &[],
    };

    static PRODUCT: TableDef = TableDef {
        name: "products",
        columns: &[
            ColumnDef {
                field: "id",
                name: "id",
                nullable: false,
                primary_key: true,
                auto_increment: true,
                ..ColumnDef::BASE
            },
            ColumnDef {
                field: "name",
                name: "name",
                ty: SqlType::Text,
                nullable: false,
                unique: true,
                ..ColumnDef::BASE
            },
            ColumnDef {
                field: "active",
                name: "active",
                ty: SqlType::Boolean,
                nullable: false,
                default: Some("true"),
                ..ColumnDef::BASE
            },
        ],
        joins: &[JoinDef {
            field: "line",
            target_column: "line_id",
            related: || &LINE,
            source_field: "id",
            nullable: true,
            ..JoinDef::BASE
        }],
    };

    #[test]
    fn plain_table() {
        assert_eq!(
            create_table_sql(&LINE).unwrap(),
            "CREATE TABLE IF NOT EXISTS \"lines\" (\
             \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
             \"name\" TEXT NOT NULL);"
        );
    }

    #[test]
    fn join_column_and_foreign_key() {
        assert_eq!(
            create_table_sql(&PRODUCT).unwrap(),
            "CREATE TABLE IF NOT EXISTS \"products\" (\
             \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
             \"name\" TEXT NOT NULL UNIQUE, \
             \"active\" INTEGER NOT NULL DEFAULT 1, \
             \"line_id\" INTEGER, \
             FOREIGN KEY (\"line_id\") REFERENCES \"lines\" (\"id\"));"
        );
    }

    #[test]
    fn text_default_is_quoted() {
        static DEF: TableDef = TableDef {
            name: "notes",
            columns: &[ColumnDef {
                field: "body",
                name: "body",
                ty: SqlType::Text,
                default: Some("n/a"),
                ..ColumnDef::BASE
            }],
            joins: &[],
        };
        assert_eq!(
            create_table_sql(&DEF).unwrap(),
            "CREATE TABLE IF NOT EXISTS \"notes\" (\"body\" TEXT DEFAULT 'n/a');"
        );
    }

    #[test]
    fn malformed_default_is_rejected() {
        static DEF: TableDef = TableDef {
            name: "broken",
            columns: &[ColumnDef {
                field: "count",
                name: "count",
                default: Some("lots"),
                ..ColumnDef::BASE
            }],
            joins: &[],
        };
        assert!(matches!(create_table_sql(&DEF), Err(Error::Schema(..))));
    }

    #[test]
    fn join_sharing_a_declared_column_keeps_one_definition() {
        static DEF: TableDef = TableDef {
            name: "orders",
            columns: &[ColumnDef {
                field: "line_id",
                name: "line_id",
                nullable: false,
                ..ColumnDef::BASE
            }],
            joins: &[JoinDef {
                field: "line",
                target_column: "line_id",
                related: || &LINE,
                source_field: "id",
                unique: true,
                ..JoinDef::BASE
            }],
        };
        assert_eq!(
            create_table_sql(&DEF).unwrap(),
            "CREATE TABLE IF NOT EXISTS \"orders\" (\
             \"line_id\" INTEGER NOT NULL UNIQUE, \
             FOREIGN KEY (\"line_id\") REFERENCES \"lines\" (\"id\"));"
        );
    }
}

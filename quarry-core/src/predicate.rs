use crate::{Connector, Direction, Error, ParsedQuery, Result, TableDef, Value, write_identifier};

/// WHERE and ORDER BY fragments compiled from a parsed method name, ready
/// to splice into a statement with positional placeholders.
#[derive(Debug, PartialEq)]
pub struct Predicate {
    pub where_clause: String,
    pub order_clause: String,
}

impl Predicate {
    /// Append ` WHERE ...` and ` ORDER BY ...` to a statement, skipping the
    /// parts that are empty.
    pub fn write_to(&self, out: &mut String) {
        if !self.where_clause.is_empty() {
            out.push_str(" WHERE ");
            out.push_str(&self.where_clause);
        }
        if !self.order_clause.is_empty() {
            out.push(' ');
            out.push_str(&self.order_clause);
        }
    }
}

/// Compile the predicate of a parsed method name against the entity
/// metadata.
///
/// Each term becomes an equality test with a `?` placeholder; connectors
/// keep their call order and bind left to right without precedence. A term
/// that resolves to no column or join target fails with
/// `Error::FieldNotFound`.
pub fn compile(parsed: &ParsedQuery, def: &TableDef) -> Result<Predicate> {
    let mut where_clause = String::new();
    for (i, term) in parsed.terms.iter().enumerate() {
        let column = def
            .column_for_token(term)
            .ok_or_else(|| Error::FieldNotFound(term.clone()))?;
        if i > 0 {
            where_clause.push_str(match parsed.connectors[i - 1] {
                Connector::And => " AND ",
                Connector::Or => " OR ",
            });
        }
        write_identifier(&mut where_clause, column);
        where_clause.push_str(" = ?");
    }
    let mut order_clause = String::new();
    if let Some((field, direction)) = &parsed.order {
        let column = def
            .column_for_token(field)
            .ok_or_else(|| Error::FieldNotFound(field.clone()))?;
        order_clause.push_str("ORDER BY ");
        write_identifier(&mut order_clause, column);
        order_clause.push_str(match direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
    }
    Ok(Predicate {
        where_clause,
        order_clause,
    })
}

/// Check the argument count against the predicate and coerce each argument
/// to its bound form. Booleans bind as the integers 1/0; text and numeric
/// scalars pass through; anything else is refused before any SQL runs.
/// Untyped nulls are refused too, since `"col" = NULL` never matches a row.
pub fn coerce_args(parsed: &ParsedQuery, args: &[Value]) -> Result<Vec<Value>> {
    if args.len() != parsed.terms.len() {
        return Err(Error::syntax(format!(
            "predicate names {} field(s) but {} argument(s) were supplied",
            parsed.terms.len(),
            args.len()
        )));
    }
    args.iter()
        .map(|arg| match arg {
            Value::Null => Err(Error::UnsupportedArgument(
                "null has no meaning in an equality predicate".into(),
            )),
            other => coerce_arg(other),
        })
        .collect()
}

pub(crate) fn coerce_arg(arg: &Value) -> Result<Value> {
    match arg {
        Value::Boolean(v) => Ok(Value::Int64(v.map(i64::from))),
        Value::Int16(..)
        | Value::Int32(..)
        | Value::Int64(..)
        | Value::Float32(..)
        | Value::Float64(..)
        | Value::Text(..)
        | Value::Null => Ok(arg.clone()),
        Value::Blob(..) => Err(Error::UnsupportedArgument(
            "blob arguments cannot be bound in a predicate".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDef, JoinDef, SqlType, parser};

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
                field: "name",
                name: "name",
                ty: SqlType::Text,
                nullable: false,
                ..ColumnDef::BASE
            },
            ColumnDef {
                field: "active",
                name: "active",
                ty: SqlType::Boolean,
                nullable: false,
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

    fn compiled(name: &str) -> Predicate {
        compile(&parser::parse(name).unwrap(), &PRODUCT).unwrap()
    }

    #[test]
    fn equality_terms_with_connectors() {
        let predicate = compiled("findAllByNameAndActiveOrLine");
        assert_eq!(
            predicate.where_clause,
            "\"name\" = ? AND \"active\" = ? OR \"line_id\" = ?"
        );
        assert_eq!(predicate.order_clause, "");
    }

    #[test]
    fn join_token_resolves_to_target_column() {
        assert_eq!(compiled("findByLine").where_clause, "\"line_id\" = ?");
    }

    #[test]
    fn order_clause() {
        let predicate = compiled("findAllByActiveOrderByNameDesc");
        assert_eq!(predicate.order_clause, "ORDER BY \"name\" DESC");
        let mut sql = String::from("SELECT * FROM \"products\"");
        predicate.write_to(&mut sql);
        assert_eq!(
            sql,
            "SELECT * FROM \"products\" WHERE \"active\" = ? ORDER BY \"name\" DESC"
        );
    }

    #[test]
    fn unknown_field_is_reported_by_token() {
        let parsed = parser::parse("findByColor").unwrap();
        match compile(&parsed, &PRODUCT) {
            Err(Error::FieldNotFound(token)) => assert_eq!(token, "color"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn argument_coercion() {
        let parsed = parser::parse("findByNameAndActive").unwrap();
        let coerced =
            coerce_args(&parsed, &[Value::from("tools"), Value::from(true)]).unwrap();
        assert_eq!(
            coerced,
            [Value::Text(Some("tools".into())), Value::Int64(Some(1))]
        );
    }

    #[test]
    fn argument_count_mismatch() {
        let parsed = parser::parse("findByNameAndActive").unwrap();
        assert!(matches!(
            coerce_args(&parsed, &[Value::from("tools")]),
            Err(Error::QuerySyntax(..))
        ));
    }

    #[test]
    fn null_arguments_are_refused_in_predicates() {
        let parsed = parser::parse("findByName").unwrap();
        assert!(matches!(
            coerce_args(&parsed, &[Value::Null]),
            Err(Error::UnsupportedArgument(..))
        ));
    }

    #[test]
    fn blob_arguments_are_refused() {
        let parsed = parser::parse("findByName").unwrap();
        assert!(matches!(
            coerce_args(&parsed, &[Value::from(vec![1u8, 2])]),
            Err(Error::UnsupportedArgument(..))
        ));
    }
}

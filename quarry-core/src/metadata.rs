use crate::{Error, Result};

/// Semantic column type; the schema builder maps it to a SQL keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    /// 32-bit (or narrower) integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    Real,
    /// Stored as INTEGER 1/0.
    Boolean,
    /// Stored as a BIGINT (epoch-based) integer.
    Timestamp,
    Blob,
}

impl SqlType {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer | SqlType::Boolean => "INTEGER",
            SqlType::BigInt | SqlType::Timestamp => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }
}

/// Declarative specification of one mapped column.
#[derive(Debug)]
pub struct ColumnDef {
    /// Field name on the entity type.
    pub field: &'static str,
    /// Physical column name.
    pub name: &'static str,
    pub ty: SqlType,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Default literal, validated by the schema builder against `ty`.
    pub default: Option<&'static str>,
}

impl ColumnDef {
    /// All-defaults descriptor to splat over: `ColumnDef { field: "id", .. ColumnDef::BASE }`.
    pub const BASE: ColumnDef = ColumnDef {
        field: "",
        name: "",
        ty: SqlType::Integer,
        nullable: true,
        unique: false,
        primary_key: false,
        auto_increment: false,
        default: None,
    };
}

/// Declarative specification of a foreign-key relationship field.
///
/// `source_field` names the field on the related entity that supplies the
/// key value; it does not have to be the related entity's primary key, and
/// when several related rows share that value, hydration keeps the first
/// match.
#[derive(Debug)]
pub struct JoinDef {
    /// Relation field on the owning entity.
    pub field: &'static str,
    /// Foreign-key column stored on the owning table.
    pub target_column: &'static str,
    /// Metadata of the related entity type.
    pub related: fn() -> &'static TableDef,
    /// Field on the related entity supplying the foreign-key value.
    pub source_field: &'static str,
    pub nullable: bool,
    pub unique: bool,
    /// Default key literal. When the foreign key is absent at read time this
    /// produces a placeholder stub carrying only the parsed default in the
    /// source field, not a fetched row.
    pub default: Option<&'static str>,
}

impl JoinDef {
    pub const BASE: JoinDef = JoinDef {
        field: "",
        target_column: "",
        related: || &EMPTY_DEF,
        source_field: "",
        nullable: false,
        unique: false,
        default: None,
    };

    /// Column descriptor of the source field on the related table.
    pub fn source_column(&self) -> Result<&'static ColumnDef> {
        let related = (self.related)();
        related.column_by_field(self.source_field).ok_or_else(|| {
            Error::schema(format!(
                "join field '{}' names source field '{}' absent from table '{}'",
                self.field, self.source_field, related.name
            ))
        })
    }
}

static EMPTY_DEF: TableDef = TableDef {
    name: "",
    columns: &[],
    joins: &[],
};

/// Immutable schema metadata of one entity type.
///
/// Built once as a `'static` and shared; `check` enforces the structural
/// invariants before a repository accepts the type.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub joins: &'static [JoinDef],
}

impl TableDef {
    /// Validate the descriptor set, failing with `Error::Schema` on a
    /// missing table name, an empty field set, an autoincrement column that
    /// is not the primary key, a nullable primary key, more than one primary
    /// key, or a join whose related type lacks table metadata.
    pub fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::schema("entity has no table name defined"));
        }
        if self.columns.is_empty() && self.joins.is_empty() {
            return Err(Error::schema(format!(
                "table '{}' has no columns or joins defined",
                self.name
            )));
        }
        let mut primary_keys = 0;
        for column in self.columns {
            if column.name.is_empty() || column.field.is_empty() {
                return Err(Error::schema(format!(
                    "table '{}' has a column without a name",
                    self.name
                )));
            }
            if column.auto_increment && !column.primary_key {
                return Err(Error::schema(format!(
                    "column '{}' in table '{}' is AUTOINCREMENT but not PRIMARY KEY",
                    column.name, self.name
                )));
            }
            if column.primary_key {
                primary_keys += 1;
                if column.nullable {
                    return Err(Error::schema(format!(
                        "primary key column '{}' in table '{}' cannot be nullable",
                        column.name, self.name
                    )));
                }
            }
        }
        if primary_keys > 1 {
            return Err(Error::schema(format!(
                "table '{}' declares more than one primary key",
                self.name
            )));
        }
        for join in self.joins {
            if join.target_column.is_empty() || join.source_field.is_empty() {
                return Err(Error::schema(format!(
                    "join field '{}' in table '{}' lacks a target column or source field",
                    join.field, self.name
                )));
            }
            let related = (join.related)();
            if related.name.is_empty() {
                return Err(Error::schema(format!(
                    "join field '{}' in table '{}' references a type without table metadata",
                    join.field, self.name
                )));
            }
            join.source_column()?;
        }
        Ok(())
    }

    pub fn primary_key(&self) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn column_by_field(&self, field: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| fields_match(c.field, field))
    }

    pub fn column_by_name(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn join_by_field(&self, field: &str) -> Option<&'static JoinDef> {
        self.joins.iter().find(|j| fields_match(j.field, field))
    }

    /// Resolve a method-name-derived field token to a physical column:
    /// plain columns first, then join target columns.
    pub fn column_for_token(&self, token: &str) -> Option<&'static str> {
        if let Some(column) = self.column_by_field(token) {
            return Some(column.name);
        }
        self.join_by_field(token).map(|j| j.target_column)
    }
}

/// Case-insensitive field comparison ignoring underscores, so the camelCase
/// token `ProductLine` matches the field `product_line`.
pub fn fields_match(field: &str, token: &str) -> bool {
    let mut left = field.chars().filter(|c| *c != '_');
    let mut right = token.chars().filter(|c| *c != '_');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) if l.eq_ignore_ascii_case(&r) => continue,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BARE: TableDef = TableDef {
        name: "bare",
        columns: &[ColumnDef {
            field: "id",
            name: "id",
            nullable: false,
            primary_key: true,
            auto_increment: true,
            ..ColumnDef::BASE
        }],
        joins: &[],
    };

    #[test]
    fn valid_table_checks() {
        BARE.check().unwrap();
        assert_eq!(BARE.primary_key().unwrap().name, "id");
    }

    #[test]
    fn missing_table_name_is_rejected() {
        static DEF: TableDef = TableDef {
            name: "",
            columns: &[],
            joins: &[],
        };
        assert!(matches!(DEF.check(), Err(Error::Schema(..))));
    }

    #[test]
    fn empty_field_set_is_rejected() {
        static DEF: TableDef = TableDef {
            name: "empty",
            columns: &[],
            joins: &[],
        };
        assert!(matches!(DEF.check(), Err(Error::Schema(..))));
    }

    #[test]
    fn auto_increment_requires_primary_key() {
        static DEF: TableDef = TableDef {
            name: "broken",
            columns: &[ColumnDef {
                field: "id",
                name: "id",
                auto_increment: true,
                ..ColumnDef::BASE
            }],
            joins: &[],
        };
        assert!(matches!(DEF.check(), Err(Error::Schema(..))));
    }

    #[test]
    fn nullable_primary_key_is_rejected() {
        static DEF: TableDef = TableDef {
            name: "broken",
            columns: &[ColumnDef {
                field: "id",
                name: "id",
                nullable: true,
                primary_key: true,
                ..ColumnDef::BASE
            }],
            joins: &[],
        };
        assert!(matches!(DEF.check(), Err(Error::Schema(..))));
    }

    #[test]
    fn camel_token_lookup() {
        static DEF: TableDef = TableDef {
            name: "t",
            columns: &[ColumnDef {
                field: "product_line",
                name: "line_id",
                nullable: false,
                ..ColumnDef::BASE
            }],
            joins: &[],
        };
        assert_eq!(DEF.column_for_token("productLine"), Some("line_id"));
        assert_eq!(DEF.column_for_token("ProductLine"), Some("line_id"));
        assert_eq!(DEF.column_for_token("missing"), None);
    }
}

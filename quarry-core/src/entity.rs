use crate::{Record, Result, TableDef};

/// A data type mapped to exactly one table.
///
/// Implementations are written once per type (the descriptors are plain
/// `'static` data, so the whole mapping is checked at compile time):
///
/// ```
/// use quarry_core::{ColumnDef, Entity, Record, Result, SqlType, TableDef};
///
/// struct Line {
///     id: i32,
///     name: String,
/// }
///
/// impl Entity for Line {
///     fn table_def() -> &'static TableDef {
///         static DEF: TableDef = TableDef {
///             name: "lines",
///             columns: &[
///                 ColumnDef {
///                     field: "id",
///                     name: "id",
///                     nullable: false,
///                     primary_key: true,
///                     auto_increment: true,
///                     ..ColumnDef::BASE
///                 },
///                 ColumnDef {
///                     field: "name",
///                     name: "name",
///                     ty: SqlType::Text,
///                     nullable: false,
///                     ..ColumnDef::BASE
///                 },
///             ],
///             joins: &[],
///         };
///         &DEF
///     }
///
///     fn to_record(&self) -> Record {
///         let mut record = Record::new();
///         record.set("id", self.id).set("name", self.name.clone());
///         record
///     }
///
///     fn from_record(record: &Record) -> Result<Self> {
///         Ok(Self {
///             id: record.decode("id")?,
///             name: record.decode("name")?,
///         })
///     }
/// }
/// ```
pub trait Entity: Sized {
    /// Immutable schema metadata of this type.
    fn table_def() -> &'static TableDef;

    /// Snapshot the entity's mapped fields (and populated relation fields)
    /// into a record.
    fn to_record(&self) -> Record;

    /// Rebuild an instance from a record; SQL NULL decodes to `None`/zero.
    fn from_record(record: &Record) -> Result<Self>;
}

use std::fmt::Write;
use thiserror::Error;

/// The single error family of the crate.
///
/// Every failure surfaces synchronously to the caller as one of these kinds;
/// nothing is recovered locally and there are no partial-success semantics.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid table/column metadata, unsupported column type,
    /// malformed default value.
    #[error("schema error: {0}")]
    Schema(String),

    /// Unrecognized verb, malformed `OrderBy` suffix, missing predicate
    /// where one is required, invalid sort direction.
    #[error("query syntax error: {0}")]
    QuerySyntax(String),

    /// A predicate, order or update column references a field absent from
    /// the entity metadata.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// A call argument cannot be bound as a SQL scalar.
    #[error("unsupported argument type: {0}")]
    UnsupportedArgument(String),

    /// One or more null/uniqueness constraint violations, collected across
    /// all fields and reported together.
    #[error("entity validation failed: {}", join_messages(.0))]
    Validation(Vec<String>),

    /// The underlying engine rejected a statement; wraps its message.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::QuerySyntax(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// The individual violation messages of a `Validation` error.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation(messages) => messages,
            _ => &[],
        }
    }
}

fn join_messages(messages: &[String]) -> String {
    let mut out = String::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            let _ = out.write_str(", ");
        }
        let _ = out.write_str(message);
    }
    out
}

pub type Result<T> = std::result::Result<T, Error>;

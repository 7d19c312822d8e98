pub use quarry_core::*;

#[cfg(feature = "sqlite")]
pub use quarry_sqlite as sqlite;

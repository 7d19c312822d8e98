mod connection;
mod entity;
mod error;
mod join;
mod metadata;
mod parser;
mod predicate;
mod query;
mod record;
mod schema;
mod util;
mod validate;
mod value;

pub use connection::*;
pub use entity::*;
pub use error::*;
pub use join::*;
pub use metadata::*;
pub use parser::*;
pub use predicate::*;
pub use query::*;
pub use record::*;
pub use schema::*;
pub use util::*;
pub use validate::*;
pub use value::*;

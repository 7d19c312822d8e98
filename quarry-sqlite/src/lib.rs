mod cursor;
mod store;

pub use cursor::*;
pub use store::*;

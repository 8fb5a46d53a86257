//! Theme files, rules, and saved sessions on disk.

pub mod load;
pub mod persistence;
pub mod schema;

pub use load::*;
pub use persistence::*;
pub use schema::*;

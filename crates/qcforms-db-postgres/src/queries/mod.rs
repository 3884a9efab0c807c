//! SQL query implementations.

pub mod crud;

pub use crud::{META_COLUMNS, column_list};

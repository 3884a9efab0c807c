pub mod form;
pub mod migrate;

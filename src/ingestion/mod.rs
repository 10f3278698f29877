//! Ingestion - locating the four source exports and reading them as raw tables.
//!
//! Nothing here knows about components or catalogs; the relation store turns
//! these tables into typed relations.

pub mod csv_loader;
pub mod source_locator;

pub use csv_loader::{read_table, read_table_from_str, RawTable};
pub use source_locator::{locate, wildcard_regex, SourcePaths, SourcePatterns};

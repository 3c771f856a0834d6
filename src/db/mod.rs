//! Database module: the Azure SQL collaborator.
//!
//! Layout:
//! - `azure.rs`: per-request tiberius client and the usage queries
//! - `rows.rs`: tolerant conversions from `tiberius::Row` cells

pub mod azure;
pub mod rows;

pub use azure::{AzureSqlConnection, ProductColumn, UsageRow};

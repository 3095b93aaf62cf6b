//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - Manufacturer(Name, Address)
//! - Distributor(Name, Address, SIN)
//! - Salesperson(SIN, Name, Commission)
//! - Shoes(Model, Size)
//! - Makes(ManufacturerName, Model, Size, Prod_Cost)
//! - Sells(DistributorName, DistributorAddress, Model, Size, Cost)
//! - Contract(DistributorName, DistributorAddress, ManufacturerName, Cost)
//! - Employs(DistributorName, DistributorAddress, SalesSIN, Base_Salary)

pub mod schema;
pub mod sqlite;

pub use sqlite::{format_value, DanglingReference, DbStats, SqliteStore, StoreOptions};

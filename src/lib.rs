//! # shoedist - Shoe distribution data model
//!
//! Relational schema and access layer for a shoe distribution domain.
//!
//! shoedist provides:
//! - Composite natural keys as value types with structural equality and hashing
//! - Typed rows for manufacturers, distributors, salespeople, shoes and their relationships
//! - SQLite-backed storage with explicit referential integrity checks
//! - Derived relationship collections computed by query
//! - Dataset import/export for seeding and backups

pub mod keys;
pub mod entity;
pub mod storage;
pub mod relations;
pub mod dataset;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use keys::{ContractId, DistributorId, EmploysId, EntityKey, MakesId, SellsId, ShoesId};
pub use entity::{
    Contract, Distributor, Employs, Entity, Makes, Manufacturer, Salesperson, Sells, Shoes, Table,
};
pub use storage::{SqliteStore, StoreOptions};
pub use relations::Relations;
pub use dataset::Dataset;

/// Result type alias for shoedist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for shoedist operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{table} {key} not found")]
    NotFound { table: Table, key: String },

    #[error("{table} {key} already exists")]
    DuplicateKey { table: Table, key: String },

    #[error("Foreign key violation on {table} {key}: {reason}")]
    ForeignKeyViolation {
        table: Table,
        key: String,
        reason: ForeignKeyReason,
    },

    #[error("{table} {key}: {column} must be a finite number, got {value}")]
    InvalidValue {
        table: Table,
        key: String,
        column: &'static str,
        value: f64,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: std::path::PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("{child} has no foreign key to {parent}")]
    NoRelation { child: Table, parent: Table },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Error::ForeignKeyViolation { .. })
    }
}

/// Why a write broke referential integrity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKeyReason {
    /// An insert referenced a parent row that does not exist
    MissingParent { parent: Table, parent_key: String },
    /// A delete would leave rows in other tables pointing at nothing
    Referenced { dependents: Vec<(Table, usize)> },
    /// SQLite's own constraint check fired; it does not say which key
    Constraint,
}

impl std::fmt::Display for ForeignKeyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForeignKeyReason::MissingParent { parent, parent_key } => {
                write!(f, "references missing {} {}", parent, parent_key)
            }
            ForeignKeyReason::Referenced { dependents } => {
                write!(f, "still referenced by ")?;
                for (i, (table, count)) in dependents.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {} row(s)", count, table)?;
                }
                Ok(())
            }
            ForeignKeyReason::Constraint => write!(f, "rejected by database constraint"),
        }
    }
}

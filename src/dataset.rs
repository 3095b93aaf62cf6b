//! Dataset - every row of every table as one serde document
//!
//! Used to seed a database from JSON and to dump one back out. Rows are
//! applied parents first, so a dataset exported from a consistent database
//! always loads into an empty one.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entity::{
    Contract, Distributor, Employs, Entity, Makes, Manufacturer, Salesperson, Sells, Shoes, Table,
};
use crate::storage::SqliteStore;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub manufacturers: Vec<Manufacturer>,
    pub distributors: Vec<Distributor>,
    pub salespeople: Vec<Salesperson>,
    pub shoes: Vec<Shoes>,
    pub makes: Vec<Makes>,
    pub sells: Vec<Sells>,
    pub contracts: Vec<Contract>,
    pub employs: Vec<Employs>,
}

impl Dataset {
    /// Read a dataset from a JSON file
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the dataset as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read every row out of a store
    pub fn export(store: &SqliteStore) -> Result<Self> {
        Ok(Self {
            manufacturers: store.list()?,
            distributors: store.list()?,
            salespeople: store.list()?,
            shoes: store.list()?,
            makes: store.list()?,
            sells: store.list()?,
            contracts: store.list()?,
            employs: store.list()?,
        })
    }

    /// Insert every row, parents before children.
    ///
    /// Stops at the first failing row; rows inserted before it stay.
    pub fn apply(&self, store: &SqliteStore) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        insert_all(store, &self.manufacturers, &mut report)?;
        insert_all(store, &self.distributors, &mut report)?;
        insert_all(store, &self.salespeople, &mut report)?;
        insert_all(store, &self.shoes, &mut report)?;
        insert_all(store, &self.makes, &mut report)?;
        insert_all(store, &self.sells, &mut report)?;
        insert_all(store, &self.contracts, &mut report)?;
        insert_all(store, &self.employs, &mut report)?;
        info!("Loaded {} rows", report.total());
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.manufacturers.len()
            + self.distributors.len()
            + self.salespeople.len()
            + self.shoes.len()
            + self.makes.len()
            + self.sells.len()
            + self.contracts.len()
            + self.employs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert_all<E: Entity>(store: &SqliteStore, rows: &[E], report: &mut LoadReport) -> Result<()> {
    for row in rows {
        store.insert(row)?;
    }
    if !rows.is_empty() {
        report.inserted.push((E::TABLE, rows.len()));
    }
    Ok(())
}

/// Rows inserted per table by [`Dataset::apply`]
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub inserted: Vec<(Table, usize)>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.inserted.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (table, count) in &self.inserted {
            writeln!(f, "  {}: {}", table, count)?;
        }
        write!(f, "  Total: {}", self.total())
    }
}

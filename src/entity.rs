//! Entity types - one row type per table
//!
//! Four base tables and four relationship tables:
//! - `Manufacturer`, `Distributor`, `Salesperson`, `Shoes`
//! - `Makes`: manufacturer → shoes, with production cost
//! - `Sells`: distributor → shoes, with sale cost
//! - `Contract`: distributor → manufacturer, with contract cost
//! - `Employs`: distributor → salesperson, with base salary
//!
//! Relationship collections (a distributor's contracts, a shoe's sellers, ...)
//! are not fields here; see [`crate::relations`].

use crate::keys::{ContractId, DistributorId, EmploysId, EntityKey, MakesId, SellsId, ShoesId};
use crate::{Error, Result};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    Manufacturer,
    Distributor,
    Salesperson,
    Shoes,
    Makes,
    Sells,
    Contract,
    Employs,
}

impl Table {
    /// Table name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Manufacturer => "Manufacturer",
            Table::Distributor => "Distributor",
            Table::Salesperson => "Salesperson",
            Table::Shoes => "Shoes",
            Table::Makes => "Makes",
            Table::Sells => "Sells",
            Table::Contract => "Contract",
            Table::Employs => "Employs",
        }
    }

    /// All tables, parents before children
    pub fn all() -> &'static [Table] {
        &[
            Table::Manufacturer,
            Table::Distributor,
            Table::Salesperson,
            Table::Shoes,
            Table::Makes,
            Table::Sells,
            Table::Contract,
            Table::Employs,
        ]
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "manufacturer" | "manufacturers" => Ok(Table::Manufacturer),
            "distributor" | "distributors" => Ok(Table::Distributor),
            "salesperson" | "salespeople" => Ok(Table::Salesperson),
            "shoes" | "shoe" => Ok(Table::Shoes),
            "makes" => Ok(Table::Makes),
            "sells" => Ok(Table::Sells),
            "contract" | "contracts" => Ok(Table::Contract),
            "employs" => Ok(Table::Employs),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row type stored in one table.
///
/// Columns are always laid out as the primary-key columns followed by the
/// attribute columns, matching [`crate::storage::schema::TableDef`].
pub trait Entity: Sized + Clone + fmt::Debug {
    type Key: EntityKey;

    const TABLE: Table;

    /// The row's primary key
    fn key(&self) -> Self::Key;

    /// Non-key column values in column order
    fn attributes(&self) -> Vec<Value>;

    /// Build a row from a result row selected as key columns then attributes
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub name: String,
    pub address: String,
}

impl Manufacturer {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl Entity for Manufacturer {
    type Key = String;
    const TABLE: Table = Table::Manufacturer;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Text(self.address.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            address: row.get(1)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributor {
    pub name: String,
    pub address: String,
    pub sin: String,
}

impl Distributor {
    pub fn new(name: impl Into<String>, address: impl Into<String>, sin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            sin: sin.into(),
        }
    }
}

impl Entity for Distributor {
    type Key = DistributorId;
    const TABLE: Table = Table::Distributor;

    fn key(&self) -> DistributorId {
        DistributorId::new(self.name.clone(), self.address.clone())
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Text(self.sin.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            address: row.get(1)?,
            sin: row.get(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salesperson {
    pub sin: String,
    pub name: String,
    pub commission: f64,
}

impl Salesperson {
    pub fn new(sin: impl Into<String>, name: impl Into<String>, commission: f64) -> Self {
        Self {
            sin: sin.into(),
            name: name.into(),
            commission,
        }
    }
}

impl Entity for Salesperson {
    type Key = String;
    const TABLE: Table = Table::Salesperson;

    fn key(&self) -> String {
        self.sin.clone()
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone()), Value::Real(self.commission)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            sin: row.get(0)?,
            name: row.get(1)?,
            commission: row.get(2)?,
        })
    }
}

/// A shoe model in one size. The row is nothing but its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shoes {
    pub model: String,
    pub size: i32,
}

impl Shoes {
    pub fn new(model: impl Into<String>, size: i32) -> Self {
        Self {
            model: model.into(),
            size,
        }
    }
}

impl Entity for Shoes {
    type Key = ShoesId;
    const TABLE: Table = Table::Shoes;

    fn key(&self) -> ShoesId {
        ShoesId::new(self.model.clone(), self.size)
    }

    fn attributes(&self) -> Vec<Value> {
        Vec::new()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            model: row.get(0)?,
            size: row.get(1)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Makes {
    pub manufacturer_name: String,
    pub model: String,
    pub size: i32,
    pub prod_cost: f64,
}

impl Makes {
    pub fn new(
        manufacturer_name: impl Into<String>,
        model: impl Into<String>,
        size: i32,
        prod_cost: f64,
    ) -> Self {
        Self {
            manufacturer_name: manufacturer_name.into(),
            model: model.into(),
            size,
            prod_cost,
        }
    }

    pub fn shoes_id(&self) -> ShoesId {
        ShoesId::new(self.model.clone(), self.size)
    }
}

impl Entity for Makes {
    type Key = MakesId;
    const TABLE: Table = Table::Makes;

    fn key(&self) -> MakesId {
        MakesId::new(self.manufacturer_name.clone(), self.model.clone(), self.size)
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Real(self.prod_cost)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            manufacturer_name: row.get(0)?,
            model: row.get(1)?,
            size: row.get(2)?,
            prod_cost: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sells {
    pub distributor_name: String,
    pub distributor_address: String,
    pub model: String,
    pub size: i32,
    pub cost: f64,
}

impl Sells {
    pub fn new(distributor: &DistributorId, shoes: &ShoesId, cost: f64) -> Self {
        Self {
            distributor_name: distributor.name.clone(),
            distributor_address: distributor.address.clone(),
            model: shoes.model.clone(),
            size: shoes.size,
            cost,
        }
    }

    pub fn distributor_id(&self) -> DistributorId {
        DistributorId::new(self.distributor_name.clone(), self.distributor_address.clone())
    }

    pub fn shoes_id(&self) -> ShoesId {
        ShoesId::new(self.model.clone(), self.size)
    }
}

impl Entity for Sells {
    type Key = SellsId;
    const TABLE: Table = Table::Sells;

    fn key(&self) -> SellsId {
        SellsId::new(&self.distributor_id(), &self.shoes_id())
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Real(self.cost)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            distributor_name: row.get(0)?,
            distributor_address: row.get(1)?,
            model: row.get(2)?,
            size: row.get(3)?,
            cost: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub distributor_name: String,
    pub distributor_address: String,
    pub manufacturer_name: String,
    pub cost: f64,
}

impl Contract {
    pub fn new(distributor: &DistributorId, manufacturer_name: impl Into<String>, cost: f64) -> Self {
        Self {
            distributor_name: distributor.name.clone(),
            distributor_address: distributor.address.clone(),
            manufacturer_name: manufacturer_name.into(),
            cost,
        }
    }

    pub fn distributor_id(&self) -> DistributorId {
        DistributorId::new(self.distributor_name.clone(), self.distributor_address.clone())
    }
}

impl Entity for Contract {
    type Key = ContractId;
    const TABLE: Table = Table::Contract;

    fn key(&self) -> ContractId {
        ContractId::new(&self.distributor_id(), self.manufacturer_name.clone())
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Real(self.cost)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            distributor_name: row.get(0)?,
            distributor_address: row.get(1)?,
            manufacturer_name: row.get(2)?,
            cost: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employs {
    pub distributor_name: String,
    pub distributor_address: String,
    pub sales_sin: String,
    pub base_salary: f64,
}

impl Employs {
    pub fn new(distributor: &DistributorId, sales_sin: impl Into<String>, base_salary: f64) -> Self {
        Self {
            distributor_name: distributor.name.clone(),
            distributor_address: distributor.address.clone(),
            sales_sin: sales_sin.into(),
            base_salary,
        }
    }

    pub fn distributor_id(&self) -> DistributorId {
        DistributorId::new(self.distributor_name.clone(), self.distributor_address.clone())
    }
}

impl Entity for Employs {
    type Key = EmploysId;
    const TABLE: Table = Table::Employs;

    fn key(&self) -> EmploysId {
        EmploysId::new(&self.distributor_id(), self.sales_sin.clone())
    }

    fn attributes(&self) -> Vec<Value> {
        vec![Value::Real(self.base_salary)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            distributor_name: row.get(0)?,
            distributor_address: row.get(1)?,
            sales_sin: row.get(2)?,
            base_salary: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::all() {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), *table);
        }
        assert_eq!("salespeople".parse::<Table>().unwrap(), Table::Salesperson);
        assert!(matches!("orders".parse::<Table>(), Err(Error::UnknownTable(_))));
    }

    #[test]
    fn test_rows_with_equal_key_fields_share_a_key() {
        let a = Makes::new("Acme", "Runner", 10, 12.5);
        let b = Makes::new("Acme", "Runner", 10, 99.0);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.shoes_id(), ShoesId::new("Runner", 10));
    }

    #[test]
    fn test_relationship_rows_point_at_parents() {
        let stride = DistributorId::new("Stride", "9 Dock Rd");
        let contract = Contract::new(&stride, "Acme", 1_000.0);
        assert_eq!(contract.distributor_id(), stride);
        assert_eq!(contract.key().manufacturer_name, "Acme");

        let sells = Sells::new(&stride, &ShoesId::new("Runner", 10), 80.0);
        assert_eq!(sells.key().distributor(), stride);
        assert_eq!(sells.key().shoes(), sells.shoes_id());
    }
}

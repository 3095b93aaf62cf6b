//! Composite keys - natural primary keys as value types
//!
//! Every table is keyed by natural columns rather than a surrogate id:
//! - `Manufacturer`: Name (`String`)
//! - `Salesperson`: SIN (`String`)
//! - `Distributor`: `DistributorId` (Name, Address)
//! - `Shoes`: `ShoesId` (Model, Size)
//! - `Makes`: `MakesId` (ManufacturerName, Model, Size)
//! - `Sells`: `SellsId` (DistributorName, DistributorAddress, Model, Size)
//! - `Contract`: `ContractId` (DistributorName, DistributorAddress, ManufacturerName)
//! - `Employs`: `EmploysId` (DistributorName, DistributorAddress, SalesSIN)
//!
//! Equality, hashing and ordering are derived, so two keys are the same key
//! exactly when every component matches.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A primary key that can be bound as SQL parameters.
pub trait EntityKey: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display {
    /// Component values in primary-key column order
    fn values(&self) -> Vec<Value>;
}

impl EntityKey for String {
    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.clone())]
    }
}

/// Key of a `Distributor` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DistributorId {
    pub name: String,
    pub address: String,
}

impl DistributorId {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl EntityKey for DistributorId {
    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone()), Value::Text(self.address.clone())]
    }
}

impl fmt::Display for DistributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.address)
    }
}

/// Key of a `Shoes` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShoesId {
    pub model: String,
    pub size: i32,
}

impl ShoesId {
    pub fn new(model: impl Into<String>, size: i32) -> Self {
        Self {
            model: model.into(),
            size,
        }
    }
}

impl EntityKey for ShoesId {
    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.model.clone()), Value::Integer(self.size.into())]
    }
}

impl fmt::Display for ShoesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.model, self.size)
    }
}

/// Key of a `Makes` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MakesId {
    pub manufacturer_name: String,
    pub model: String,
    pub size: i32,
}

impl MakesId {
    pub fn new(manufacturer_name: impl Into<String>, model: impl Into<String>, size: i32) -> Self {
        Self {
            manufacturer_name: manufacturer_name.into(),
            model: model.into(),
            size,
        }
    }

    pub fn shoes(&self) -> ShoesId {
        ShoesId::new(self.model.clone(), self.size)
    }
}

impl EntityKey for MakesId {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.manufacturer_name.clone()),
            Value::Text(self.model.clone()),
            Value::Integer(self.size.into()),
        ]
    }
}

impl fmt::Display for MakesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.manufacturer_name, self.model, self.size)
    }
}

/// Key of a `Sells` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SellsId {
    pub distributor_name: String,
    pub distributor_address: String,
    pub model: String,
    pub size: i32,
}

impl SellsId {
    pub fn new(distributor: &DistributorId, shoes: &ShoesId) -> Self {
        Self {
            distributor_name: distributor.name.clone(),
            distributor_address: distributor.address.clone(),
            model: shoes.model.clone(),
            size: shoes.size,
        }
    }

    pub fn distributor(&self) -> DistributorId {
        DistributorId::new(self.distributor_name.clone(), self.distributor_address.clone())
    }

    pub fn shoes(&self) -> ShoesId {
        ShoesId::new(self.model.clone(), self.size)
    }
}

impl EntityKey for SellsId {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.distributor_name.clone()),
            Value::Text(self.distributor_address.clone()),
            Value::Text(self.model.clone()),
            Value::Integer(self.size.into()),
        ]
    }
}

impl fmt::Display for SellsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.distributor_name, self.distributor_address, self.model, self.size
        )
    }
}

/// Key of a `Contract` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId {
    pub distributor_name: String,
    pub distributor_address: String,
    pub manufacturer_name: String,
}

impl ContractId {
    pub fn new(distributor: &DistributorId, manufacturer_name: impl Into<String>) -> Self {
        Self {
            distributor_name: distributor.name.clone(),
            distributor_address: distributor.address.clone(),
            manufacturer_name: manufacturer_name.into(),
        }
    }

    pub fn distributor(&self) -> DistributorId {
        DistributorId::new(self.distributor_name.clone(), self.distributor_address.clone())
    }
}

impl EntityKey for ContractId {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.distributor_name.clone()),
            Value::Text(self.distributor_address.clone()),
            Value::Text(self.manufacturer_name.clone()),
        ]
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.distributor_name, self.distributor_address, self.manufacturer_name
        )
    }
}

/// Key of an `Employs` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmploysId {
    pub distributor_name: String,
    pub distributor_address: String,
    pub sales_sin: String,
}

impl EmploysId {
    pub fn new(distributor: &DistributorId, sales_sin: impl Into<String>) -> Self {
        Self {
            distributor_name: distributor.name.clone(),
            distributor_address: distributor.address.clone(),
            sales_sin: sales_sin.into(),
        }
    }

    pub fn distributor(&self) -> DistributorId {
        DistributorId::new(self.distributor_name.clone(), self.distributor_address.clone())
    }
}

impl EntityKey for EmploysId {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.distributor_name.clone()),
            Value::Text(self.distributor_address.clone()),
            Value::Text(self.sales_sin.clone()),
        ]
    }
}

impl fmt::Display for EmploysId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.distributor_name, self.distributor_address, self.sales_sin
        )
    }
}

//! Derived relationship collections
//!
//! A distributor's contracts, a shoe model's sellers and so on are never
//! stored on the parent row. Each collection is a query over the child
//! table's foreign key, so it always reflects the current rows.

use crate::entity::{Contract, Distributor, Employs, Makes, Manufacturer, Salesperson, Sells, Shoes};
use crate::keys::{DistributorId, ShoesId};
use crate::storage::SqliteStore;
use crate::Result;

/// Relationship queries over a store
pub struct Relations<'a> {
    store: &'a SqliteStore,
}

impl<'a> Relations<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    // ========== Distributor ==========

    pub fn distributor_contracts(&self, distributor: &DistributorId) -> Result<Vec<Contract>> {
        self.store.list_by_foreign_key::<Distributor, Contract>(distributor)
    }

    pub fn distributor_employs(&self, distributor: &DistributorId) -> Result<Vec<Employs>> {
        self.store.list_by_foreign_key::<Distributor, Employs>(distributor)
    }

    pub fn distributor_sells(&self, distributor: &DistributorId) -> Result<Vec<Sells>> {
        self.store.list_by_foreign_key::<Distributor, Sells>(distributor)
    }

    // ========== Manufacturer ==========

    pub fn manufacturer_contracts(&self, manufacturer: &str) -> Result<Vec<Contract>> {
        self.store
            .list_by_foreign_key::<Manufacturer, Contract>(&manufacturer.to_string())
    }

    pub fn manufacturer_makes(&self, manufacturer: &str) -> Result<Vec<Makes>> {
        self.store
            .list_by_foreign_key::<Manufacturer, Makes>(&manufacturer.to_string())
    }

    // ========== Shoes ==========

    pub fn shoes_makes(&self, shoes: &ShoesId) -> Result<Vec<Makes>> {
        self.store.list_by_foreign_key::<Shoes, Makes>(shoes)
    }

    pub fn shoes_sells(&self, shoes: &ShoesId) -> Result<Vec<Sells>> {
        self.store.list_by_foreign_key::<Shoes, Sells>(shoes)
    }

    // ========== Salesperson ==========

    pub fn salesperson_employs(&self, sin: &str) -> Result<Vec<Employs>> {
        self.store
            .list_by_foreign_key::<Salesperson, Employs>(&sin.to_string())
    }

    // ========== Parents ==========

    /// The manufacturer and shoe model of a production row
    pub fn makes_parties(&self, makes: &Makes) -> Result<(Manufacturer, Shoes)> {
        let manufacturer = self.store.get::<Manufacturer>(&makes.manufacturer_name)?;
        let shoes = self.store.get::<Shoes>(&makes.shoes_id())?;
        Ok((manufacturer, shoes))
    }

    /// The distributor and shoe model of a sales row
    pub fn sells_parties(&self, sells: &Sells) -> Result<(Distributor, Shoes)> {
        let distributor = self.store.get::<Distributor>(&sells.distributor_id())?;
        let shoes = self.store.get::<Shoes>(&sells.shoes_id())?;
        Ok((distributor, shoes))
    }

    /// The distributor and manufacturer a contract binds
    pub fn contract_parties(&self, contract: &Contract) -> Result<(Distributor, Manufacturer)> {
        let distributor = self.store.get::<Distributor>(&contract.distributor_id())?;
        let manufacturer = self.store.get::<Manufacturer>(&contract.manufacturer_name)?;
        Ok((distributor, manufacturer))
    }

    /// The distributor and salesperson of an employment
    pub fn employment_parties(&self, employs: &Employs) -> Result<(Distributor, Salesperson)> {
        let distributor = self.store.get::<Distributor>(&employs.distributor_id())?;
        let salesperson = self.store.get::<Salesperson>(&employs.sales_sin)?;
        Ok((distributor, salesperson))
    }
}

//! Database schema definitions
//!
//! Table and column names are kept verbatim for compatibility with existing
//! databases. The `TableDef` metadata below mirrors the DDL and drives the
//! generic access code in `sqlite.rs`.

use crate::entity::Table;

/// SQL to create the Manufacturer table
pub const CREATE_MANUFACTURER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Manufacturer (
    Name TEXT NOT NULL PRIMARY KEY,
    Address TEXT NOT NULL
)
"#;

/// SQL to create the Distributor table
pub const CREATE_DISTRIBUTOR_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Distributor (
    Name TEXT NOT NULL,
    Address TEXT NOT NULL,
    SIN TEXT NOT NULL,
    PRIMARY KEY (Name, Address)
)
"#;

/// SQL to create the Salesperson table
pub const CREATE_SALESPERSON_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Salesperson (
    SIN TEXT NOT NULL PRIMARY KEY,
    Name TEXT NOT NULL,
    Commission REAL NOT NULL
)
"#;

/// SQL to create the Shoes table
pub const CREATE_SHOES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Shoes (
    Model TEXT NOT NULL,
    Size INTEGER NOT NULL,
    PRIMARY KEY (Model, Size)
)
"#;

/// SQL to create the Makes table (manufacturer → shoes)
pub const CREATE_MAKES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Makes (
    ManufacturerName TEXT NOT NULL,
    Model TEXT NOT NULL,
    Size INTEGER NOT NULL,
    Prod_Cost REAL NOT NULL,
    PRIMARY KEY (ManufacturerName, Model, Size),
    FOREIGN KEY (ManufacturerName) REFERENCES Manufacturer (Name)
        ON DELETE RESTRICT ON UPDATE RESTRICT,
    FOREIGN KEY (Model, Size) REFERENCES Shoes (Model, Size)
        ON DELETE RESTRICT ON UPDATE RESTRICT
)
"#;

/// SQL to create the Sells table (distributor → shoes)
pub const CREATE_SELLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Sells (
    DistributorName TEXT NOT NULL,
    DistributorAddress TEXT NOT NULL,
    Model TEXT NOT NULL,
    Size INTEGER NOT NULL,
    Cost REAL NOT NULL,
    PRIMARY KEY (DistributorName, DistributorAddress, Model, Size),
    FOREIGN KEY (DistributorName, DistributorAddress) REFERENCES Distributor (Name, Address)
        ON DELETE RESTRICT ON UPDATE RESTRICT,
    FOREIGN KEY (Model, Size) REFERENCES Shoes (Model, Size)
        ON DELETE RESTRICT ON UPDATE RESTRICT
)
"#;

/// SQL to create the Contract table (distributor → manufacturer)
pub const CREATE_CONTRACT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Contract (
    DistributorName TEXT NOT NULL,
    DistributorAddress TEXT NOT NULL,
    ManufacturerName TEXT NOT NULL,
    Cost REAL NOT NULL,
    PRIMARY KEY (DistributorName, DistributorAddress, ManufacturerName),
    FOREIGN KEY (DistributorName, DistributorAddress) REFERENCES Distributor (Name, Address)
        ON DELETE RESTRICT ON UPDATE RESTRICT,
    FOREIGN KEY (ManufacturerName) REFERENCES Manufacturer (Name)
        ON DELETE RESTRICT ON UPDATE RESTRICT
)
"#;

/// SQL to create the Employs table (distributor → salesperson)
pub const CREATE_EMPLOYS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Employs (
    DistributorName TEXT NOT NULL,
    DistributorAddress TEXT NOT NULL,
    SalesSIN TEXT NOT NULL,
    Base_Salary REAL NOT NULL,
    PRIMARY KEY (DistributorName, DistributorAddress, SalesSIN),
    FOREIGN KEY (DistributorName, DistributorAddress) REFERENCES Distributor (Name, Address)
        ON DELETE RESTRICT ON UPDATE RESTRICT,
    FOREIGN KEY (SalesSIN) REFERENCES Salesperson (SIN)
        ON DELETE RESTRICT ON UPDATE RESTRICT
)
"#;

/// SQL to create indexes on foreign keys that are not a primary-key prefix
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_makes_shoes ON Makes(Model, Size)",
    "CREATE INDEX IF NOT EXISTS idx_sells_shoes ON Sells(Model, Size)",
    "CREATE INDEX IF NOT EXISTS idx_contract_manufacturer ON Contract(ManufacturerName)",
    "CREATE INDEX IF NOT EXISTS idx_employs_salesperson ON Employs(SalesSIN)",
];

/// All schema creation statements, parents before children
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_MANUFACTURER_TABLE,
        CREATE_DISTRIBUTOR_TABLE,
        CREATE_SALESPERSON_TABLE,
        CREATE_SHOES_TABLE,
        CREATE_MAKES_TABLE,
        CREATE_SELLS_TABLE,
        CREATE_CONTRACT_TABLE,
        CREATE_EMPLOYS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Column layout and references of one table
#[derive(Debug)]
pub struct TableDef {
    pub table: Table,
    pub key_columns: &'static [&'static str],
    pub attribute_columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKeyDef],
}

/// A foreign key from some of a table's key columns to a parent's primary key
#[derive(Debug)]
pub struct ForeignKeyDef {
    /// Local columns, aligned with `parent_columns`
    pub columns: &'static [&'static str],
    pub parent: Table,
    /// The parent's primary-key columns, in its key order
    pub parent_columns: &'static [&'static str],
}

impl TableDef {
    /// Key columns followed by attribute columns
    pub fn columns(&self) -> Vec<&'static str> {
        self.key_columns
            .iter()
            .chain(self.attribute_columns.iter())
            .copied()
            .collect()
    }

    /// The foreign key pointing at `parent`, if any
    pub fn foreign_key_to(&self, parent: Table) -> Option<&'static ForeignKeyDef> {
        self.foreign_keys.iter().find(|fk| fk.parent == parent)
    }
}

const DISTRIBUTOR_PARENT: &[&str] = &["Name", "Address"];
const SHOES_PARENT: &[&str] = &["Model", "Size"];

pub const TABLES: &[TableDef] = &[
    TableDef {
        table: Table::Manufacturer,
        key_columns: &["Name"],
        attribute_columns: &["Address"],
        foreign_keys: &[],
    },
    TableDef {
        table: Table::Distributor,
        key_columns: &["Name", "Address"],
        attribute_columns: &["SIN"],
        foreign_keys: &[],
    },
    TableDef {
        table: Table::Salesperson,
        key_columns: &["SIN"],
        attribute_columns: &["Name", "Commission"],
        foreign_keys: &[],
    },
    TableDef {
        table: Table::Shoes,
        key_columns: &["Model", "Size"],
        attribute_columns: &[],
        foreign_keys: &[],
    },
    TableDef {
        table: Table::Makes,
        key_columns: &["ManufacturerName", "Model", "Size"],
        attribute_columns: &["Prod_Cost"],
        foreign_keys: &[
            ForeignKeyDef {
                columns: &["ManufacturerName"],
                parent: Table::Manufacturer,
                parent_columns: &["Name"],
            },
            ForeignKeyDef {
                columns: &["Model", "Size"],
                parent: Table::Shoes,
                parent_columns: SHOES_PARENT,
            },
        ],
    },
    TableDef {
        table: Table::Sells,
        key_columns: &["DistributorName", "DistributorAddress", "Model", "Size"],
        attribute_columns: &["Cost"],
        foreign_keys: &[
            ForeignKeyDef {
                columns: &["DistributorName", "DistributorAddress"],
                parent: Table::Distributor,
                parent_columns: DISTRIBUTOR_PARENT,
            },
            ForeignKeyDef {
                columns: &["Model", "Size"],
                parent: Table::Shoes,
                parent_columns: SHOES_PARENT,
            },
        ],
    },
    TableDef {
        table: Table::Contract,
        key_columns: &["DistributorName", "DistributorAddress", "ManufacturerName"],
        attribute_columns: &["Cost"],
        foreign_keys: &[
            ForeignKeyDef {
                columns: &["DistributorName", "DistributorAddress"],
                parent: Table::Distributor,
                parent_columns: DISTRIBUTOR_PARENT,
            },
            ForeignKeyDef {
                columns: &["ManufacturerName"],
                parent: Table::Manufacturer,
                parent_columns: &["Name"],
            },
        ],
    },
    TableDef {
        table: Table::Employs,
        key_columns: &["DistributorName", "DistributorAddress", "SalesSIN"],
        attribute_columns: &["Base_Salary"],
        foreign_keys: &[
            ForeignKeyDef {
                columns: &["DistributorName", "DistributorAddress"],
                parent: Table::Distributor,
                parent_columns: DISTRIBUTOR_PARENT,
            },
            ForeignKeyDef {
                columns: &["SalesSIN"],
                parent: Table::Salesperson,
                parent_columns: &["SIN"],
            },
        ],
    },
];

/// Metadata for `table`
pub fn table_def(table: Table) -> &'static TableDef {
    // TABLES is declared in `Table::all()` order
    &TABLES[table as usize]
}

/// Every foreign key, across all tables, that points at `parent`
pub fn referencing(parent: Table) -> impl Iterator<Item = (&'static TableDef, &'static ForeignKeyDef)> {
    TABLES.iter().flat_map(move |def| {
        def.foreign_keys
            .iter()
            .filter(move |fk| fk.parent == parent)
            .map(move |fk| (def, fk))
    })
}

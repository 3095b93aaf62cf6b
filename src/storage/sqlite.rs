//! SQLite storage implementation

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{ffi, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, warn};

use super::schema::{self, table_def, TableDef};
use crate::entity::{Entity, Table};
use crate::keys::EntityKey;
use crate::{Error, ForeignKeyReason, Result};

/// Connection settings for a store handle
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long a writer waits for another handle's write lock
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// SQLite-backed storage for the distribution schema.
///
/// Each handle owns one connection. Share a database between threads by
/// opening one handle per thread on the same file; writes are serialized by
/// SQLite's write lock.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, &StoreOptions::default())
    }

    /// Open a database file with explicit connection settings
    pub fn open_with_options(path: &Path, options: &StoreOptions) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::DatabaseOpen {
            path: path.to_owned(),
            source: e,
        })?;
        conn.busy_timeout(options.busy_timeout)?;
        let store = Self { conn };
        let mode: String = store
            .conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        store.conn.pragma_update(None, "synchronous", "NORMAL")?;
        debug!("Journal mode {}", mode);
        store.configure_pragmas()?;
        store.initialize_schema()?;
        debug!("Opened database at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.configure_pragmas()?;
        store.initialize_schema()?;
        debug!("Created in-memory database");
        Ok(store)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn write_transaction(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?)
    }

    // ========== Row Operations ==========

    /// Get a row by its full key, or `NotFound`
    pub fn get<E: Entity>(&self, key: &E::Key) -> Result<E> {
        self.find::<E>(key)?.ok_or_else(|| Error::NotFound {
            table: E::TABLE,
            key: key.to_string(),
        })
    }

    /// Get a row by its full key
    pub fn find<E: Entity>(&self, key: &E::Key) -> Result<Option<E>> {
        let def = table_def(E::TABLE);
        let sql = format!("{} WHERE {}", select_sql(def), predicate(def.key_columns, 1));
        self.conn
            .query_row(&sql, params_from_iter(key.values()), |row| E::from_row(row))
            .optional()
            .map_err(Into::into)
    }

    /// Check whether a row with this key exists
    pub fn exists<E: Entity>(&self, key: &E::Key) -> Result<bool> {
        key_exists(&self.conn, table_def(E::TABLE), &key.values())
    }

    /// Insert a new row.
    ///
    /// Fails with `DuplicateKey` if the key is taken and with
    /// `ForeignKeyViolation` if a referenced parent row is missing.
    pub fn insert<E: Entity>(&self, row: &E) -> Result<()> {
        let def = table_def(E::TABLE);
        let key = row.key();
        let key_values = key.values();
        let attributes = row.attributes();
        check_finite(def, &attributes, &key)?;

        let tx = self.write_transaction()?;

        if key_exists(&tx, def, &key_values)? {
            return Err(Error::DuplicateKey {
                table: E::TABLE,
                key: key.to_string(),
            });
        }

        for fk in def.foreign_keys {
            let parent_values = project(def, &key_values, fk.columns);
            if !key_exists(&tx, table_def(fk.parent), &parent_values)? {
                return Err(Error::ForeignKeyViolation {
                    table: E::TABLE,
                    key: key.to_string(),
                    reason: ForeignKeyReason::MissingParent {
                        parent: fk.parent,
                        parent_key: describe_values(&parent_values),
                    },
                });
            }
        }

        let columns = def.columns();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            def.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut values = key_values;
        values.extend(attributes);
        tx.execute(&sql, params_from_iter(values))
            .map_err(|e| constraint_error(e, E::TABLE, &key))?;
        tx.commit()?;

        debug!(table = %E::TABLE, key = %key, "Inserted row");
        Ok(())
    }

    /// Overwrite the non-key columns of an existing row
    pub fn update<E: Entity>(&self, row: &E) -> Result<()> {
        let def = table_def(E::TABLE);
        let key = row.key();
        let mut values = row.attributes();
        check_finite(def, &values, &key)?;

        let tx = self.write_transaction()?;

        // Nothing to write for key-only tables; the row just has to exist
        let changed = if def.attribute_columns.is_empty() {
            usize::from(key_exists(&tx, def, &key.values())?)
        } else {
            let sql = format!(
                "UPDATE {} SET {} WHERE {}",
                def.table,
                assignments(def.attribute_columns),
                predicate(def.key_columns, def.attribute_columns.len() + 1)
            );
            values.extend(key.values());
            tx.execute(&sql, params_from_iter(values))
                .map_err(|e| constraint_error(e, E::TABLE, &key))?
        };

        if changed == 0 {
            return Err(Error::NotFound {
                table: E::TABLE,
                key: key.to_string(),
            });
        }
        tx.commit()?;

        debug!(table = %E::TABLE, key = %key, "Updated row");
        Ok(())
    }

    /// Delete a row by key.
    ///
    /// Refused with `ForeignKeyViolation` while rows in other tables still
    /// reference it. Nothing cascades: remove children first.
    pub fn delete<E: Entity>(&self, key: &E::Key) -> Result<()> {
        let def = table_def(E::TABLE);
        let key_values = key.values();

        let tx = self.write_transaction()?;

        if !key_exists(&tx, def, &key_values)? {
            return Err(Error::NotFound {
                table: E::TABLE,
                key: key.to_string(),
            });
        }

        let dependents = dependents_of(&tx, E::TABLE, &key_values)?;
        if !dependents.is_empty() {
            return Err(Error::ForeignKeyViolation {
                table: E::TABLE,
                key: key.to_string(),
                reason: ForeignKeyReason::Referenced { dependents },
            });
        }

        let sql = format!("DELETE FROM {} WHERE {}", def.table, predicate(def.key_columns, 1));
        tx.execute(&sql, params_from_iter(key_values))
            .map_err(|e| constraint_error(e, E::TABLE, key))?;
        tx.commit()?;

        debug!(table = %E::TABLE, key = %key, "Deleted row");
        Ok(())
    }

    // ========== Listing Operations ==========

    /// All rows of a table, ordered by primary key
    pub fn list<E: Entity>(&self) -> Result<Vec<E>> {
        let def = table_def(E::TABLE);
        let sql = format!("{} ORDER BY {}", select_sql(def), def.key_columns.join(", "));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| E::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Rows of `E` whose foreign key to `P` equals `parent_key`, ordered by
    /// `E`'s primary key.
    ///
    /// ```ignore
    /// let contracts = store.list_by_foreign_key::<Distributor, Contract>(&distributor_id)?;
    /// ```
    pub fn list_by_foreign_key<P: Entity, E: Entity>(&self, parent_key: &P::Key) -> Result<Vec<E>> {
        let def = table_def(E::TABLE);
        let fk = def.foreign_key_to(P::TABLE).ok_or(Error::NoRelation {
            child: E::TABLE,
            parent: P::TABLE,
        })?;

        let sql = format!(
            "{} WHERE {} ORDER BY {}",
            select_sql(def),
            predicate(fk.columns, 1),
            def.key_columns.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(parent_key.values()), |row| E::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Count rows of an entity
    pub fn count<E: Entity>(&self) -> Result<usize> {
        self.count_table(E::TABLE)
    }

    /// Count rows of a table
    pub fn count_table(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let counts = Table::all()
            .iter()
            .map(|table| -> Result<(Table, usize)> { Ok((*table, self.count_table(*table)?)) })
            .collect::<Result<Vec<_>>>()?;
        Ok(DbStats { counts })
    }

    // ========== Integrity ==========

    /// Rows whose foreign keys point at nothing.
    ///
    /// Only possible for databases written with `foreign_keys` disabled,
    /// e.g. by another tool.
    pub fn integrity_report(&self) -> Result<Vec<DanglingReference>> {
        let mut stmt = self.conn.prepare("PRAGMA foreign_key_check")?;
        let raw = stmt
            .query_map([], |row| {
                let table: String = row.get(0)?;
                let rowid: Option<i64> = row.get(1)?;
                let parent: String = row.get(2)?;
                Ok((table, rowid, parent))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut report = Vec::with_capacity(raw.len());
        for (table, rowid, parent) in raw {
            let table: Table = table.parse()?;
            let parent: Table = parent.parse()?;
            let key = match rowid {
                Some(rowid) => self.describe_rowid(table, rowid)?,
                None => String::from("?"),
            };
            report.push(DanglingReference { table, key, parent });
        }
        Ok(report)
    }

    fn describe_rowid(&self, table: Table, rowid: i64) -> Result<String> {
        let def = table_def(table);
        let sql = format!("SELECT {} FROM {} WHERE rowid = ?1", def.key_columns.join(", "), table);
        let values = self.conn.query_row(&sql, [rowid], |row| {
            (0..def.key_columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(describe_values(&values))
    }
}

// ========== SQL helpers ==========

fn select_sql(def: &TableDef) -> String {
    format!("SELECT {} FROM {}", def.columns().join(", "), def.table)
}

/// `a = ?n AND b = ?n+1 ...`
fn predicate(columns: &[&str], first_param: usize) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column, first_param + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn assignments(columns: &[&str]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pick the values of `columns` out of a row's key values
fn project(def: &TableDef, key_values: &[Value], columns: &[&str]) -> Vec<Value> {
    columns
        .iter()
        .filter_map(|column| def.key_columns.iter().position(|k| k == column))
        .map(|i| key_values[i].clone())
        .collect()
}

fn key_exists(conn: &Connection, def: &TableDef, key_values: &[Value]) -> Result<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} LIMIT 1",
        def.table,
        predicate(def.key_columns, 1)
    );
    let found: Option<i64> = conn
        .query_row(&sql, params_from_iter(key_values), |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Row counts of every child table still pointing at this parent key
fn dependents_of(conn: &Connection, parent: Table, key_values: &[Value]) -> Result<Vec<(Table, usize)>> {
    let mut dependents = Vec::new();
    for (child, fk) in schema::referencing(parent) {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            child.table,
            predicate(fk.columns, 1)
        );
        let count: i64 = conn.query_row(&sql, params_from_iter(key_values), |row| row.get(0))?;
        if count > 0 {
            dependents.push((child.table, count as usize));
        }
    }
    Ok(dependents)
}

/// SQLite stores NaN as NULL, so non-finite reals never reach a write
fn check_finite(def: &TableDef, attributes: &[Value], key: &dyn fmt::Display) -> Result<()> {
    for (column, value) in def.attribute_columns.iter().zip(attributes) {
        if let Value::Real(f) = value {
            if !f.is_finite() {
                return Err(Error::InvalidValue {
                    table: def.table,
                    key: key.to_string(),
                    column: *column,
                    value: *f,
                });
            }
        }
    }
    Ok(())
}

/// Translate a constraint failure reported by SQLite into a domain error.
///
/// The explicit checks run first inside the same write transaction, so this
/// only fires when something else wrote the database concurrently without
/// taking the write lock, or wrote it with constraints off.
fn constraint_error(err: rusqlite::Error, table: Table, key: &dyn fmt::Display) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                warn!(%table, %key, "Primary key constraint fired");
                return Error::DuplicateKey {
                    table,
                    key: key.to_string(),
                };
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                warn!(%table, %key, "Foreign key constraint fired");
                return Error::ForeignKeyViolation {
                    table,
                    key: key.to_string(),
                    reason: ForeignKeyReason::Constraint,
                };
            }
            _ => {}
        }
    }
    Error::Storage(err)
}

/// Render a SQL value for messages and tables
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Render key values the same way the key types display themselves
fn describe_values(values: &[Value]) -> String {
    match values {
        [single] => format_value(single),
        _ => format!(
            "({})",
            values.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// A row whose foreign key matches no parent row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub table: Table,
    pub key: String,
    pub parent: Table,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} → missing {}", self.table, self.key, self.parent)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub counts: Vec<(Table, usize)>,
}

impl DbStats {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn get(&self, table: Table) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

impl fmt::Display for DbStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (table, count) in &self.counts {
            writeln!(f, "  {}: {}", table, count)?;
        }
        write!(f, "  Total: {}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Contract, Distributor, Employs, Makes, Manufacturer, Salesperson, Sells, Shoes};
    use crate::keys::{ContractId, DistributorId, EmploysId, MakesId, SellsId, ShoesId};

    fn stride() -> DistributorId {
        DistributorId::new("Stride", "9 Dock Rd")
    }

    /// Acme makes Runner/10, Stride sells it, holds a contract with Acme and
    /// employs one salesperson.
    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&Manufacturer::new("Acme", "1 Main St")).unwrap();
        store.insert(&Distributor::new("Stride", "9 Dock Rd", "111-222-333")).unwrap();
        store.insert(&Salesperson::new("123-456-789", "Dana", 0.05)).unwrap();
        store.insert(&Shoes::new("Runner", 10)).unwrap();
        store.insert(&Makes::new("Acme", "Runner", 10, 12.5)).unwrap();
        store.insert(&Sells::new(&stride(), &ShoesId::new("Runner", 10), 80.0)).unwrap();
        store.insert(&Contract::new(&stride(), "Acme", 1_000.0)).unwrap();
        store.insert(&Employs::new(&stride(), "123-456-789", 40_000.0)).unwrap();
        store
    }

    #[test]
    fn test_manufacturer_crud() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.insert(&Manufacturer::new("Acme", "1 Main St")).unwrap();
        let acme: Manufacturer = store.get(&"Acme".to_string()).unwrap();
        assert_eq!(acme.address, "1 Main St");

        store.update(&Manufacturer::new("Acme", "2 Main St")).unwrap();
        let acme: Manufacturer = store.get(&"Acme".to_string()).unwrap();
        assert_eq!(acme.address, "2 Main St");

        store.delete::<Manufacturer>(&"Acme".to_string()).unwrap();
        assert!(store.find::<Manufacturer>(&"Acme".to_string()).unwrap().is_none());
    }

    #[test]
    fn test_get_missing_key_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.get::<Shoes>(&ShoesId::new("Ghost", 1)).unwrap_err();
        assert!(matches!(err, Error::NotFound { table: Table::Shoes, .. }));
    }

    #[test]
    fn test_makes_requires_shoes() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&Manufacturer::new("Acme", "1 Main St")).unwrap();

        let makes = Makes::new("Acme", "Runner", 10, 12.5);
        let err = store.insert(&makes).unwrap_err();
        match err {
            Error::ForeignKeyViolation {
                table,
                reason: ForeignKeyReason::MissingParent { parent, parent_key },
                ..
            } => {
                assert_eq!(table, Table::Makes);
                assert_eq!(parent, Table::Shoes);
                assert_eq!(parent_key, "(Runner, 10)");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        store.insert(&Shoes::new("Runner", 10)).unwrap();
        store.insert(&makes).unwrap();
        let stored: Makes = store.get(&MakesId::new("Acme", "Runner", 10)).unwrap();
        assert_eq!(stored.prod_cost, 12.5);
    }

    #[test]
    fn test_makes_requires_manufacturer() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&Shoes::new("Runner", 10)).unwrap();

        let err = store.insert(&Makes::new("Nobody", "Runner", 10, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::ForeignKeyViolation {
                reason: ForeignKeyReason::MissingParent { parent: Table::Manufacturer, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_sells_requires_shoes() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&Distributor::new("Stride", "9 Dock Rd", "111")).unwrap();

        let err = store
            .insert(&Sells::new(&stride(), &ShoesId::new("Runner", 10), 80.0))
            .unwrap_err();
        assert!(err.is_foreign_key_violation());
        assert_eq!(store.count::<Sells>().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_contract() {
        let store = seeded_store();
        let err = store.insert(&Contract::new(&stride(), "Acme", 2_000.0)).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { table: Table::Contract, .. }));

        // The first write is untouched
        let contract: Contract = store.get(&ContractId::new(&stride(), "Acme")).unwrap();
        assert_eq!(contract.cost, 1_000.0);
    }

    #[test]
    fn test_distributor_delete_is_restricted() {
        let store = seeded_store();

        let err = store.delete::<Distributor>(&stride()).unwrap_err();
        match err {
            Error::ForeignKeyViolation {
                reason: ForeignKeyReason::Referenced { dependents },
                ..
            } => {
                assert_eq!(
                    dependents,
                    vec![(Table::Sells, 1), (Table::Contract, 1), (Table::Employs, 1)]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        store
            .delete::<Sells>(&SellsId::new(&stride(), &ShoesId::new("Runner", 10)))
            .unwrap();
        assert!(store.delete::<Distributor>(&stride()).is_err());

        store.delete::<Contract>(&ContractId::new(&stride(), "Acme")).unwrap();
        store.delete::<Employs>(&EmploysId::new(&stride(), "123-456-789")).unwrap();
        store.delete::<Distributor>(&stride()).unwrap();
        assert!(!store.exists::<Distributor>(&stride()).unwrap());
    }

    #[test]
    fn test_shoes_delete_is_restricted_by_makes_and_sells() {
        let store = seeded_store();
        let err = store.delete::<Shoes>(&ShoesId::new("Runner", 10)).unwrap_err();
        assert!(err.to_string().contains("1 Makes row(s), 1 Sells row(s)"));
    }

    #[test]
    fn test_update_and_delete_missing_rows() {
        let store = SqliteStore::open_in_memory().unwrap();

        let err = store.update(&Salesperson::new("000", "Nobody", 0.1)).unwrap_err();
        assert!(err.is_not_found());

        let err = store.update(&Shoes::new("Runner", 10)).unwrap_err();
        assert!(err.is_not_found());

        let err = store.delete::<Manufacturer>(&"Acme".to_string()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_changes_only_attributes() {
        let store = seeded_store();
        store
            .update(&Employs::new(&stride(), "123-456-789", 45_000.0))
            .unwrap();

        let employs: Employs = store.get(&EmploysId::new(&stride(), "123-456-789")).unwrap();
        assert_eq!(employs.base_salary, 45_000.0);
        assert_eq!(store.count::<Employs>().unwrap(), 1);
    }

    #[test]
    fn test_list_by_foreign_key() {
        let store = seeded_store();
        store.insert(&Manufacturer::new("Zephyr", "5 Hill Rd")).unwrap();
        store.insert(&Contract::new(&stride(), "Zephyr", 500.0)).unwrap();

        let contracts = store.list_by_foreign_key::<Distributor, Contract>(&stride()).unwrap();
        let names: Vec<&str> = contracts.iter().map(|c| c.manufacturer_name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Zephyr"]);

        let for_zephyr = store
            .list_by_foreign_key::<Manufacturer, Contract>(&"Zephyr".to_string())
            .unwrap();
        assert_eq!(for_zephyr.len(), 1);

        let other = DistributorId::new("Stride", "10 Dock Rd");
        assert!(store.list_by_foreign_key::<Distributor, Contract>(&other).unwrap().is_empty());
    }

    #[test]
    fn test_list_by_unrelated_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .list_by_foreign_key::<Salesperson, Makes>(&"123".to_string())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NoRelation { child: Table::Makes, parent: Table::Salesperson }
        ));
    }

    #[test]
    fn test_list_is_sorted_by_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (model, size) in [("Walker", 8), ("Runner", 11), ("Runner", 9)] {
            store.insert(&Shoes::new(model, size)).unwrap();
        }

        let keys: Vec<ShoesId> = store.list::<Shoes>().unwrap().iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            vec![ShoesId::new("Runner", 9), ShoesId::new("Runner", 11), ShoesId::new("Walker", 8)]
        );
    }

    #[test]
    fn test_stats() {
        let store = seeded_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total(), 8);
        assert_eq!(stats.get(Table::Makes), 1);
        assert!(stats.to_string().contains("Employs: 1"));
    }

    #[test]
    fn test_schema_matches_table_defs() {
        let store = SqliteStore::open_in_memory().unwrap();
        for def in schema::TABLES {
            let mut stmt = store
                .connection()
                .prepare(&format!("PRAGMA table_info({})", def.table))
                .unwrap();
            let columns: Vec<(String, i64)> = stmt
                .query_map([], |row| Ok((row.get(1)?, row.get(5)?)))
                .unwrap()
                .collect::<rusqlite::Result<_>>()
                .unwrap();

            let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
            assert_eq!(names, def.columns(), "{}", def.table);

            let key_count = columns.iter().filter(|(_, pk)| *pk > 0).count();
            assert_eq!(key_count, def.key_columns.len(), "{}", def.table);
        }
    }

    #[test]
    fn test_constraint_backstop() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .connection()
            .execute("INSERT INTO Makes VALUES ('Ghost', 'Runner', 10, 1.0)", [])
            .unwrap_err();

        let mapped = constraint_error(err, Table::Makes, &"(Ghost, Runner, 10)");
        assert!(matches!(
            mapped,
            Error::ForeignKeyViolation { reason: ForeignKeyReason::Constraint, .. }
        ));
    }

    #[test]
    fn test_integrity_report_finds_orphans() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.integrity_report().unwrap().is_empty());

        store
            .connection()
            .execute_batch(
                "PRAGMA foreign_keys = OFF;
                 INSERT INTO Employs VALUES ('Ghost', 'Nowhere', '999', 1.0);
                 PRAGMA foreign_keys = ON;",
            )
            .unwrap();

        let report = store.integrity_report().unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|r| r.table == Table::Employs));
        assert!(report.iter().any(|r| r.parent == Table::Distributor));
        assert!(report.iter().any(|r| r.parent == Table::Salesperson));
        assert_eq!(report[0].key, "(Ghost, Nowhere, 999)");
    }

    #[test]
    fn test_concurrent_inserts_have_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&Manufacturer::new("Acme", "1 Main St")).unwrap();
            store.insert(&Distributor::new("Stride", "9 Dock Rd", "111")).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = SqliteStore::open(&path).unwrap();
                    store.insert(&Contract::new(&stride(), "Acme", 100.0 * i as f64))
                })
            })
            .collect();

        let results: Vec<Result<()>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.is_duplicate_key()));

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count::<Contract>().unwrap(), 1);
    }

    #[test]
    fn test_delete_racing_dependent_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delete-race.db");

        for round in 0..10 {
            {
                let store = SqliteStore::open(&path).unwrap();
                if round == 0 {
                    store.insert(&Manufacturer::new("Acme", "1 Main St")).unwrap();
                }
                store.insert(&Shoes::new("Runner", 10)).unwrap();
            }

            let deleter = {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = SqliteStore::open(&path).unwrap();
                    store.delete::<Shoes>(&ShoesId::new("Runner", 10))
                })
            };
            let inserter = {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = SqliteStore::open(&path).unwrap();
                    store.insert(&Makes::new("Acme", "Runner", 10, 12.5))
                })
            };
            let deleted = deleter.join().unwrap();
            let inserted = inserter.join().unwrap();

            assert!(deleted.is_ok() ^ inserted.is_ok(), "round {round}");
            match (&deleted, &inserted) {
                (Err(e), Ok(())) | (Ok(()), Err(e)) => assert!(e.is_foreign_key_violation()),
                _ => unreachable!(),
            }

            let store = SqliteStore::open(&path).unwrap();
            assert!(store.integrity_report().unwrap().is_empty());

            // Reset for the next round
            if inserted.is_ok() {
                store.delete::<Makes>(&MakesId::new("Acme", "Runner", 10)).unwrap();
                store.delete::<Shoes>(&ShoesId::new("Runner", 10)).unwrap();
            }
        }
    }

    #[test]
    fn test_non_finite_attributes_are_rejected() {
        let store = seeded_store();

        store.insert(&Manufacturer::new("Zephyr", "5 Hill Rd")).unwrap();

        let err = store
            .insert(&Makes::new("Zephyr", "Runner", 10, f64::NAN))
            .unwrap_err();
        match err {
            Error::InvalidValue { table, column, .. } => {
                assert_eq!(table, Table::Makes);
                assert_eq!(column, "Prod_Cost");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!store.exists::<Makes>(&MakesId::new("Zephyr", "Runner", 10)).unwrap());

        let err = store
            .update(&Contract::new(&stride(), "Acme", f64::INFINITY))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { table: Table::Contract, .. }));
        let contract: Contract = store.get(&ContractId::new(&stride(), "Acme")).unwrap();
        assert_eq!(contract.cost, 1_000.0);
    }

    #[test]
    fn test_update_commits_inside_write_transaction() {
        let store = seeded_store();
        store.update(&Shoes::new("Runner", 10)).unwrap();
        store.update(&Salesperson::new("123-456-789", "Dana", 0.07)).unwrap();

        // No transaction is left open after a successful or failed update
        assert!(store.connection().is_autocommit());
        assert!(store.update(&Salesperson::new("000", "Nobody", 0.1)).is_err());
        assert!(store.connection().is_autocommit());

        let dana: Salesperson = store.get(&"123-456-789".to_string()).unwrap();
        assert_eq!(dana.commission, 0.07);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&Shoes::new("Runner", 10)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.exists::<Shoes>(&ShoesId::new("Runner", 10)).unwrap());
    }
}

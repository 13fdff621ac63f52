// List model exposing the store to a UI binding layer

use crate::kountdown::{Kountdown, NewKountdown, SortKind};
use crate::role::{CellValue, EDIT_ROLE, Field, RoleCatalog};
use crate::store::{Row, Store};
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use eyre::Result;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Row/column address into the visible list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelIndex {
    pub row: usize,
    pub column: usize,
}

impl ModelIndex {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Ordered, role-addressable view over the kountdown table
///
/// Mutations go through a [`Transaction`] and are committed immediately by
/// the convenience methods; each returns `false` on failure after logging
/// the cause.
pub struct KountdownModel {
    store: Store,
    rows: Vec<Row>,
    roles: RoleCatalog,
    sort: SortKind,
}

impl KountdownModel {
    pub fn new(store: Store) -> Result<Self> {
        Self::with_sort(store, SortKind::default())
    }

    pub fn with_sort(store: Store, sort: SortKind) -> Result<Self> {
        let mut model = Self {
            store,
            rows: Vec::new(),
            roles: RoleCatalog::default(),
            sort,
        };
        model.select()?;
        Ok(model)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Re-query the table with the current sort and rebuild the role catalog
    pub fn select(&mut self) -> Result<()> {
        self.roles = RoleCatalog::from_columns(self.store.columns());
        self.rows = self.store.select(self.sort)?;
        Ok(())
    }

    /// Open a batch of staged changes
    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn add_kountdown(&mut self, name: &str, description: &str, date: DateTime<Utc>, colour: &str) -> bool {
        let fields = NewKountdown::new(name, description, date, colour);
        self.submit("add", |tx| tx.insert(fields))
    }

    pub fn edit_kountdown(
        &mut self,
        row: usize,
        name: &str,
        description: &str,
        date: DateTime<Utc>,
        colour: &str,
    ) -> bool {
        let fields = NewKountdown::new(name, description, date, colour);
        self.submit("edit", |tx| tx.update(row, fields))
    }

    pub fn remove_kountdown(&mut self, row: usize) -> bool {
        self.submit("remove", |tx| tx.remove(row))
    }

    pub fn remove_all_kountdowns(&mut self) -> bool {
        self.submit("remove all", |tx| {
            tx.remove_all();
            Ok(())
        })
    }

    /// Throw away staged state and reload from storage
    pub fn revert_all(&mut self) -> bool {
        match self.select() {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "Failed to reload kountdowns");
                false
            }
        }
    }

    fn submit<F>(&mut self, op: &str, stage: F) -> bool
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<()>,
    {
        let mut tx = self.transaction();
        let result = stage(&mut tx).and_then(|()| tx.commit());

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(op, error = ?e, "Kountdown change failed");
                false
            }
        }
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Re-query ordered by `kind`
    pub fn sort_model(&mut self, kind: SortKind) {
        self.sort = kind;
        if let Err(e) = self.select() {
            error!(?kind, error = ?e, "Failed to re-sort kountdowns");
        }
    }

    /// Sort by numeric code; unknown codes fall back to creation order
    pub fn sort_by_code(&mut self, code: i32) {
        self.sort_model(SortKind::from_code(code));
    }

    pub fn sort(&self) -> SortKind {
        self.sort
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.store.columns().len()
    }

    pub fn role_names(&self) -> BTreeMap<i32, String> {
        self.roles.role_names()
    }

    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    /// Value for `role` at `index`
    ///
    /// User roles read their own column regardless of `index.column`, with
    /// the date role parsed into a date-time. The edit role and any unknown
    /// role read the raw cell at `index`.
    pub fn data(&self, index: ModelIndex, role: i32) -> Option<CellValue> {
        if role == EDIT_ROLE {
            return self.cell(index.row, index.column).cloned();
        }

        match self.roles.resolve(role) {
            Some(entry) => {
                let raw = self.cell(index.row, entry.column)?;
                Some(match entry.field {
                    Some(field) => field.coerce(raw),
                    None => raw.clone(),
                })
            }
            None => {
                debug!(role, "Unmapped role, using raw cell");
                self.cell(index.row, index.column).cloned()
            }
        }
    }

    /// Value of a semantic field at `row`
    pub fn read(&self, row: usize, field: Field) -> Option<CellValue> {
        let role = self.roles.role_of(field)?;
        self.data(ModelIndex::new(row, 0), role)
    }

    /// Typed view of the visible `row`
    pub fn record(&self, row: usize) -> Option<Kountdown> {
        let text = |field| {
            self.raw(row, field)
                .and_then(CellValue::as_str)
                .map(str::to_string)
        };
        let int = |field| self.raw(row, field).and_then(CellValue::as_i64);

        Some(Kountdown {
            id: int(Field::Id)?,
            name: text(Field::Name)?,
            description: text(Field::Description)?,
            date: text(Field::Date)?,
            date_in_ms: int(Field::DateInMs)?,
            colour: text(Field::Colour)?,
        })
    }

    /// All visible rows as records, in view order
    pub fn records(&self) -> Vec<Kountdown> {
        (0..self.row_count()).filter_map(|row| self.record(row)).collect()
    }

    pub(crate) fn id_at(&self, row: usize) -> Option<i64> {
        self.raw(row, Field::Id).and_then(CellValue::as_i64)
    }

    fn raw(&self, row: usize, field: Field) -> Option<&CellValue> {
        let column = self.roles.column_of(field)?;
        self.cell(row, column)
    }

    fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }
}

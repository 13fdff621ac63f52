// Staged mutations with explicit commit/rollback

use crate::kountdown::{NewKountdown, TABLE_NAME, columns};
use crate::model::KountdownModel;
use eyre::{Context, Result, eyre};
use tracing::{debug, warn};

/// A pending mutation, resolved to row ids at staging time
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(NewKountdown),
    Update { id: i64, fields: NewKountdown },
    Delete { id: i64 },
    DeleteAll,
}

impl Change {
    fn apply(&self, tx: &rusqlite::Transaction) -> Result<()> {
        match self {
            Change::Insert(k) => {
                tx.execute(
                    &format!(
                        "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
                        TABLE_NAME,
                        columns::NAME,
                        columns::DESCRIPTION,
                        columns::DATE,
                        columns::DATE_IN_MS,
                        columns::COLOUR
                    ),
                    rusqlite::params![k.name, k.description, k.date_string(), k.date_in_ms(), k.colour],
                )
                .context("Failed to insert kountdown")?;
            }
            Change::Update { id, fields } => {
                let updated = tx
                    .execute(
                        &format!(
                            "UPDATE {} SET {} = ?1, {} = ?2, {} = ?3, {} = ?4, {} = ?5 WHERE {} = ?6",
                            TABLE_NAME,
                            columns::NAME,
                            columns::DESCRIPTION,
                            columns::DATE,
                            columns::DATE_IN_MS,
                            columns::COLOUR,
                            columns::ID
                        ),
                        rusqlite::params![
                            fields.name,
                            fields.description,
                            fields.date_string(),
                            fields.date_in_ms(),
                            fields.colour,
                            id
                        ],
                    )
                    .context("Failed to update kountdown")?;
                if updated == 0 {
                    return Err(eyre!("Kountdown {} no longer exists", id));
                }
            }
            Change::Delete { id } => {
                tx.execute(
                    &format!("DELETE FROM {} WHERE {} = ?1", TABLE_NAME, columns::ID),
                    [id],
                )
                .context("Failed to delete kountdown")?;
            }
            Change::DeleteAll => {
                tx.execute(&format!("DELETE FROM {}", TABLE_NAME), [])
                    .context("Failed to delete all kountdowns")?;
            }
        }
        Ok(())
    }
}

/// Batch of staged changes against a model
///
/// Nothing reaches the database until `commit()`. Dropping the transaction
/// without committing discards the batch, same as `rollback()`.
pub struct Transaction<'m> {
    model: &'m mut KountdownModel,
    changes: Vec<Change>,
}

impl<'m> Transaction<'m> {
    pub(crate) fn new(model: &'m mut KountdownModel) -> Self {
        Self {
            model,
            changes: Vec::new(),
        }
    }

    /// Stage a new kountdown, appended after the current rows
    pub fn insert(&mut self, fields: NewKountdown) -> Result<()> {
        validate(&fields)?;
        self.changes.push(Change::Insert(fields));
        Ok(())
    }

    /// Stage a replacement of every user field of the visible `row`
    pub fn update(&mut self, row: usize, fields: NewKountdown) -> Result<()> {
        validate(&fields)?;
        let id = self.row_id(row)?;
        self.changes.push(Change::Update { id, fields });
        Ok(())
    }

    /// Stage removal of the visible `row`
    pub fn remove(&mut self, row: usize) -> Result<()> {
        let id = self.row_id(row)?;
        self.changes.push(Change::Delete { id });
        Ok(())
    }

    /// Stage removal of every kountdown
    pub fn remove_all(&mut self) {
        self.changes.push(Change::DeleteAll);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Apply all staged changes atomically, then refresh the model
    ///
    /// On failure nothing is written; the model is still refreshed so the
    /// view matches storage.
    pub fn commit(self) -> Result<()> {
        let Transaction { model, changes } = self;
        let count = changes.len();

        let written = Self::write(model, &changes);
        let reloaded = model.select();
        write_then_reload(written, reloaded)?;

        debug!(count, "Committed kountdown changes");
        Ok(())
    }

    /// Discard all staged changes
    pub fn rollback(self) {
        debug!(count = self.changes.len(), "Rolled back kountdown changes");
    }

    fn write(model: &mut KountdownModel, changes: &[Change]) -> Result<()> {
        let tx = model
            .store_mut()
            .db_mut()
            .transaction()
            .context("Failed to begin transaction")?;

        for change in changes {
            change.apply(&tx)?;
        }

        tx.commit().context("Failed to commit transaction")?;
        Ok(())
    }

    fn row_id(&self, row: usize) -> Result<i64> {
        self.model
            .id_at(row)
            .ok_or_else(|| eyre!("Row {} out of range ({} rows)", row, self.model.row_count()))
    }
}

/// The write error wins; a reload failure is only returned if the write succeeded
fn write_then_reload(written: Result<()>, reloaded: Result<()>) -> Result<()> {
    match (written, reloaded) {
        (Err(e), Err(reload)) => {
            warn!(error = ?reload, "Failed to reload kountdowns after failed commit");
            Err(e)
        }
        (written, reloaded) => written.and(reloaded),
    }
}

fn validate(fields: &NewKountdown) -> Result<()> {
    if fields.name.is_empty() {
        return Err(eyre!("Kountdown name cannot be empty"));
    }
    Ok(())
}

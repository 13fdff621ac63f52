// SQLite-backed event store

use crate::kountdown::{Kountdown, SortKind, TABLE_NAME, columns};
use crate::role::CellValue;
use eyre::{Context, Result, eyre};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One raw table row, cells in column order
pub type Row = Vec<CellValue>;

/// Persistent store for kountdowns
pub struct Store {
    path: PathBuf,
    db: Connection,
    columns: Vec<String>,
}

impl Store {
    /// Open or create the store at the given database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }

        let db = Connection::open(&path).context("Failed to open SQLite database")?;
        Self::from_connection(path, db)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(PathBuf::from(":memory:"), db)
    }

    fn from_connection(path: PathBuf, db: Connection) -> Result<Self> {
        let mut store = Self {
            path,
            db,
            columns: Vec::new(),
        };

        store.create_schema()?;
        store.columns = store.read_columns()?;
        store.check_columns()?;

        debug!(path = ?store.path, "Opened kountdown store");
        Ok(store)
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    pub(crate) fn db_mut(&mut self) -> &mut Connection {
        &mut self.db
    }

    /// Live column names, in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Create database schema
    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db
            .execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    {id} INTEGER PRIMARY KEY AUTOINCREMENT,
                    {name} TEXT NOT NULL,
                    {description} TEXT NOT NULL,
                    {date} TEXT NOT NULL,
                    {date_in_ms} INTEGER NOT NULL,
                    {colour} TEXT NOT NULL
                );
                "#,
                table = TABLE_NAME,
                id = columns::ID,
                name = columns::NAME,
                description = columns::DESCRIPTION,
                date = columns::DATE,
                date_in_ms = columns::DATE_IN_MS,
                colour = columns::COLOUR,
            ))
            .context("Failed to create kountdown table")?;

        Ok(())
    }

    fn read_columns(&self) -> Result<Vec<String>> {
        let mut stmt = self.db.prepare(&format!("PRAGMA table_info({})", TABLE_NAME))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Reject any table layout other than the canonical one
    fn check_columns(&self) -> Result<()> {
        if self.columns.iter().map(String::as_str).eq(columns::ALL) {
            return Ok(());
        }
        Err(eyre!(
            "Unsupported layout for table {}: found columns [{}], expected [{}]",
            TABLE_NAME,
            self.columns.join(", "),
            columns::ALL.join(", ")
        ))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Select all rows in the given order
    pub fn select(&self, sort: SortKind) -> Result<Vec<Row>> {
        let query = format!("SELECT * FROM {} ORDER BY {}", TABLE_NAME, sort.order_by());
        let mut stmt = self.db.prepare(&query)?;
        let width = stmt.column_count();

        let mut rows = stmt.query([])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(CellValue::from(row.get_ref(i)?));
            }
            results.push(cells);
        }

        debug!(count = results.len(), ?sort, "Selected kountdowns");
        Ok(results)
    }

    /// All kountdowns in natural (insertion) order
    pub fn all(&self) -> Result<Vec<Kountdown>> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {}, {}, {}, {}, {}, {} FROM {}",
            columns::ID,
            columns::NAME,
            columns::DESCRIPTION,
            columns::DATE,
            columns::DATE_IN_MS,
            columns::COLOUR,
            TABLE_NAME
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(Kountdown {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                date: row.get(3)?,
                date_in_ms: row.get(4)?,
                colour: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result.context("Failed to read kountdown row")?);
        }
        Ok(results)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row(&format!("SELECT COUNT(*) FROM {}", TABLE_NAME), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("nested/daykountdown.db");

        let store = Store::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.path(), db_path.as_path());
        assert_eq!(store.columns(), &columns::ALL.map(String::from));
    }

    #[test]
    fn test_store_reopen_keeps_rows() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("daykountdown.db");

        {
            let store = Store::open(&db_path).unwrap();
            store
                .db()
                .execute(
                    "INSERT INTO KountdownModel (name, description, date, date_in_ms, colour)
                     VALUES ('Launch', '', '2024-01-15T00:00:00', 1705276800000, 'coral')",
                    [],
                )
                .unwrap();
        }

        let store = Store::open(&db_path).unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Launch");
        assert_eq!(all[0].date_in_ms, 1705276800000);
    }

    #[test]
    fn test_store_rejects_legacy_layout() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("legacy.db");

        {
            let db = Connection::open(&db_path).unwrap();
            db.execute_batch(
                "CREATE TABLE KountdownModel (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    date TEXT NOT NULL,
                    colour TEXT NOT NULL
                );",
            )
            .unwrap();
        }

        let err = Store::open(&db_path).err().unwrap();
        assert!(err.to_string().contains("Unsupported layout"));
    }

    #[test]
    fn test_select_returns_cells_in_column_order() {
        let store = Store::open_in_memory().unwrap();
        store
            .db()
            .execute(
                "INSERT INTO KountdownModel (name, description, date, date_in_ms, colour)
                 VALUES ('A', 'desc', '2024-01-15T00:00:00', 1705276800000, 'palette.text')",
                [],
            )
            .unwrap();

        let rows = store.select(SortKind::CreationAsc).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 6);
        assert_eq!(rows[0][0], CellValue::Int(1));
        assert_eq!(rows[0][1], CellValue::Text("A".to_string()));
        assert_eq!(rows[0][4], CellValue::Int(1705276800000));
        assert_eq!(store.count().unwrap(), 1);
    }
}

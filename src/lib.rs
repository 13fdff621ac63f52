// DayKountdown - countdown events in SQLite with JSON import/export

pub mod colour;
pub mod config;
pub mod kountdown;
pub mod model;
pub mod role;
pub mod store;
pub mod transaction;
pub mod transfer;

// Re-export main types for convenience
pub use colour::DEFAULT_COLOUR;
pub use config::Config;
pub use kountdown::{Kountdown, KountdownData, NewKountdown, SortKind, parse_datetime};
pub use model::{KountdownModel, ModelIndex};
pub use role::{CellValue, EDIT_ROLE, Field, RoleCatalog, USER_ROLE};
pub use store::Store;
pub use transaction::{Change, Transaction};
pub use transfer::{Exporter, ImportedKountdown, Importer, KountdownsDocument};

// Re-export rusqlite for CLI use
pub use rusqlite;

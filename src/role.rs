// Role mapping between the list view and table columns

use crate::kountdown::{columns, parse_datetime};
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use std::collections::BTreeMap;

/// Role returning the raw cell at the index's column
pub const EDIT_ROLE: i32 = 2;

/// Last role id reserved by the binding layer; user roles start above it
pub const USER_ROLE: i32 = 0x0100;

/// A single cell as read from the table, or a coerced field value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Text(String),
    DateTime(DateTime<Utc>),
}

impl CellValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Int(i),
            ValueRef::Real(f) => CellValue::Text(f.to_string()),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Semantic fields the list view exposes as roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Description,
    Date,
    DateInMs,
    Colour,
}

impl Field {
    pub fn from_column(name: &str) -> Option<Self> {
        match name {
            columns::ID => Some(Field::Id),
            columns::NAME => Some(Field::Name),
            columns::DESCRIPTION => Some(Field::Description),
            columns::DATE => Some(Field::Date),
            columns::DATE_IN_MS => Some(Field::DateInMs),
            columns::COLOUR => Some(Field::Colour),
            _ => None,
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            Field::Id => columns::ID,
            Field::Name => columns::NAME,
            Field::Description => columns::DESCRIPTION,
            Field::Date => columns::DATE,
            Field::DateInMs => columns::DATE_IN_MS,
            Field::Colour => columns::COLOUR,
        }
    }

    /// Convert a stored cell to the value handed to the view
    ///
    /// Only `Date` is coerced: the ISO-8601 text becomes a date-time, or
    /// `Null` if it does not parse.
    pub fn coerce(self, raw: &CellValue) -> CellValue {
        match self {
            Field::Date => raw
                .as_str()
                .and_then(parse_datetime)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Null),
            _ => raw.clone(),
        }
    }
}

/// One role as exposed to the binding layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    pub id: i32,
    pub name: String,
    pub column: usize,
    pub field: Option<Field>,
}

/// Role ids and names derived from the live column list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCatalog {
    entries: Vec<RoleEntry>,
}

impl RoleCatalog {
    /// Assign `USER_ROLE + 1 + i` to column `i`, named after the column
    pub fn from_columns<S: AsRef<str>>(column_names: &[S]) -> Self {
        let entries = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| RoleEntry {
                id: USER_ROLE + 1 + i as i32,
                name: name.as_ref().to_string(),
                column: i,
                field: Field::from_column(name.as_ref()),
            })
            .collect();
        Self { entries }
    }

    pub fn resolve(&self, role: i32) -> Option<&RoleEntry> {
        self.entries.iter().find(|e| e.id == role)
    }

    /// Role id for a semantic field, if the table has that column
    pub fn role_of(&self, field: Field) -> Option<i32> {
        self.entries.iter().find(|e| e.field == Some(field)).map(|e| e.id)
    }

    /// Column index holding a semantic field
    pub fn column_of(&self, field: Field) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.field == Some(field))
            .map(|e| e.column)
    }

    pub fn role_names(&self) -> BTreeMap<i32, String> {
        self.entries.iter().map(|e| (e.id, e.name.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_catalog_from_canonical_columns() {
        let catalog = RoleCatalog::from_columns(&columns::ALL);
        let names = catalog.role_names();

        assert_eq!(names.len(), 6);
        assert_eq!(names[&(USER_ROLE + 1)], "id");
        assert_eq!(names[&(USER_ROLE + 2)], "name");
        assert_eq!(names[&(USER_ROLE + 4)], "date");
        assert_eq!(names[&(USER_ROLE + 5)], "date_in_ms");
        assert_eq!(names[&(USER_ROLE + 6)], "colour");

        assert_eq!(catalog.role_of(Field::Date), Some(USER_ROLE + 4));
        assert_eq!(catalog.column_of(Field::Colour), Some(5));
    }

    #[test]
    fn test_catalog_follows_column_order() {
        let catalog = RoleCatalog::from_columns(&["colour", "id", "extra"]);

        assert_eq!(catalog.role_of(Field::Colour), Some(USER_ROLE + 1));
        assert_eq!(catalog.role_of(Field::Id), Some(USER_ROLE + 2));
        assert_eq!(catalog.role_of(Field::Name), None);

        let extra = catalog.resolve(USER_ROLE + 3).unwrap();
        assert_eq!(extra.name, "extra");
        assert_eq!(extra.field, None);
    }

    #[test]
    fn test_resolve_unknown_role() {
        let catalog = RoleCatalog::from_columns(&columns::ALL);
        assert!(catalog.resolve(EDIT_ROLE).is_none());
        assert!(catalog.resolve(USER_ROLE).is_none());
        assert!(catalog.resolve(USER_ROLE + 7).is_none());
    }

    #[test]
    fn test_date_coercion() {
        let raw = CellValue::Text("2024-01-15T00:00:00".to_string());
        let coerced = Field::Date.coerce(&raw);
        assert_eq!(
            coerced,
            CellValue::DateTime(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );

        assert_eq!(Field::Date.coerce(&CellValue::Text("soon".to_string())), CellValue::Null);
        assert_eq!(Field::Name.coerce(&raw), raw);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Text("hi".to_string()).to_string(), "hi");
        assert_eq!(CellValue::Null.to_string(), "");
    }
}

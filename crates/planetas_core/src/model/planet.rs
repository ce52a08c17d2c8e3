//! Planet domain model and its flat row mapping.
//!
//! # Responsibility
//! - Define the planet record shared by list, detail and form projections.
//! - Convert between the typed record and a column-name -> scalar row.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one; callers never invent ids.
//! - `nickname` absence is `None`, never an empty string.
//! - Conversions perform no range checks; see `model::validation`.

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned primary key.
pub type PlanetId = i64;

pub const TABLE_PLANETS: &str = "planetas";
pub const COL_ID: &str = "id";
pub const COL_NAME: &str = "nome";
pub const COL_DISTANCE_FROM_SUN: &str = "distancia_sol";
pub const COL_SIZE: &str = "tamanho";
pub const COL_NICKNAME: &str = "apelido";

/// Every column of `planetas`, key first.
pub const PLANET_COLUMNS: [&str; 5] = [
    COL_ID,
    COL_NAME,
    COL_DISTANCE_FROM_SUN,
    COL_SIZE,
    COL_NICKNAME,
];

/// Scalar value stored in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ColumnValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
        }
    }
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Self::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            Self::Text(value) => ToSqlOutput::from(value.as_str()),
        };
        Ok(output)
    }
}

impl From<Value> for ColumnValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Integer(value) => Self::Integer(value),
            Value::Real(value) => Self::Real(value),
            Value::Text(value) => Self::Text(value),
            // `planetas` has no BLOB column; keep the bytes as lossy text so
            // conversion reports a type mismatch instead of panicking.
            Value::Blob(bytes) => Self::Text(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// Flat representation of one `planetas` row keyed by column name.
pub type PlanetRow = BTreeMap<&'static str, ColumnValue>;

/// Failure converting a flat row back into a `Planet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowConversionError {
    MissingColumn(&'static str),
    UnexpectedType {
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl Display for RowConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "missing required column `{column}`"),
            Self::UnexpectedType {
                column,
                expected,
                found,
            } => write!(f, "column `{column}` expected {expected}, found {found}"),
        }
    }
}

impl Error for RowConversionError {}

/// One planet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Assigned by the store on insert, immutable afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlanetId>,
    pub name: String,
    /// Distance from the sun, strictly positive once validated.
    pub distance_from_sun: f64,
    /// Strictly positive once validated.
    pub size: f64,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Planet {
    /// Creates an unpersisted planet without a nickname.
    pub fn new(name: impl Into<String>, distance_from_sun: f64, size: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            distance_from_sun,
            size,
            nickname: None,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Returns whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Flattens the record into column values.
    ///
    /// The key column is left out when `id` is absent.
    pub fn to_row(&self) -> PlanetRow {
        let mut row = PlanetRow::new();
        if let Some(id) = self.id {
            row.insert(COL_ID, ColumnValue::Integer(id));
        }
        row.insert(COL_NAME, ColumnValue::Text(self.name.clone()));
        row.insert(
            COL_DISTANCE_FROM_SUN,
            ColumnValue::Real(self.distance_from_sun),
        );
        row.insert(COL_SIZE, ColumnValue::Real(self.size));
        row.insert(
            COL_NICKNAME,
            self.nickname
                .clone()
                .map_or(ColumnValue::Null, ColumnValue::Text),
        );
        row
    }

    /// Rebuilds a record from column values.
    ///
    /// `nome`, `distancia_sol` and `tamanho` are required; `id` and `apelido`
    /// may be missing or null.
    pub fn from_row(row: &PlanetRow) -> Result<Self, RowConversionError> {
        let id = match row.get(COL_ID) {
            None | Some(ColumnValue::Null) => None,
            Some(ColumnValue::Integer(id)) => Some(*id),
            Some(other) => return Err(unexpected(COL_ID, "integer", other)),
        };

        let name = match required(row, COL_NAME)? {
            ColumnValue::Text(name) => name.clone(),
            other => return Err(unexpected(COL_NAME, "text", other)),
        };

        let nickname = match row.get(COL_NICKNAME) {
            None | Some(ColumnValue::Null) => None,
            Some(ColumnValue::Text(nickname)) => Some(nickname.clone()),
            Some(other) => return Err(unexpected(COL_NICKNAME, "text", other)),
        };

        Ok(Self {
            id,
            name,
            distance_from_sun: real(row, COL_DISTANCE_FROM_SUN)?,
            size: real(row, COL_SIZE)?,
            nickname,
        })
    }
}

fn required<'r>(
    row: &'r PlanetRow,
    column: &'static str,
) -> Result<&'r ColumnValue, RowConversionError> {
    match row.get(column) {
        None | Some(ColumnValue::Null) => Err(RowConversionError::MissingColumn(column)),
        Some(value) => Ok(value),
    }
}

fn real(row: &PlanetRow, column: &'static str) -> Result<f64, RowConversionError> {
    match required(row, column)? {
        ColumnValue::Real(value) => Ok(*value),
        // SQLite may hand back integral REAL values as INTEGER.
        ColumnValue::Integer(value) => Ok(*value as f64),
        other => Err(unexpected(column, "real", other)),
    }
}

fn unexpected(
    column: &'static str,
    expected: &'static str,
    found: &ColumnValue,
) -> RowConversionError {
    RowConversionError::UnexpectedType {
        column,
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ColumnValue, Planet, PlanetRow, RowConversionError, COL_DISTANCE_FROM_SUN, COL_ID,
        COL_NAME, COL_NICKNAME, COL_SIZE,
    };

    #[test]
    fn to_row_omits_absent_id() {
        let row = Planet::new("Marte", 227.9, 0.53).to_row();
        assert!(!row.contains_key(COL_ID));
        assert_eq!(row.get(COL_NICKNAME), Some(&ColumnValue::Null));
    }

    #[test]
    fn to_row_keeps_assigned_id() {
        let mut planet = Planet::new("Marte", 227.9, 0.53);
        planet.id = Some(4);
        assert_eq!(planet.to_row().get(COL_ID), Some(&ColumnValue::Integer(4)));
    }

    #[test]
    fn from_row_accepts_integer_reals_and_null_nickname() {
        let mut row = PlanetRow::new();
        row.insert(COL_ID, ColumnValue::Integer(7));
        row.insert(COL_NAME, ColumnValue::Text("Jupiter".to_string()));
        row.insert(COL_DISTANCE_FROM_SUN, ColumnValue::Integer(778));
        row.insert(COL_SIZE, ColumnValue::Real(11.2));
        row.insert(COL_NICKNAME, ColumnValue::Null);

        let planet = Planet::from_row(&row).unwrap();
        assert_eq!(planet.id, Some(7));
        assert_eq!(planet.distance_from_sun, 778.0);
        assert_eq!(planet.nickname, None);
    }

    #[test]
    fn from_row_requires_domain_columns() {
        let mut row = Planet::new("Venus", 108.2, 0.95).to_row();
        row.remove(COL_SIZE);
        assert_eq!(
            Planet::from_row(&row).unwrap_err(),
            RowConversionError::MissingColumn(COL_SIZE)
        );
    }

    #[test]
    fn from_row_rejects_text_in_real_column() {
        let mut row = Planet::new("Venus", 108.2, 0.95).to_row();
        row.insert(COL_DISTANCE_FROM_SUN, ColumnValue::Text("far".to_string()));
        assert!(matches!(
            Planet::from_row(&row).unwrap_err(),
            RowConversionError::UnexpectedType {
                column: COL_DISTANCE_FROM_SUN,
                expected: "real",
                found: "text",
            }
        ));
    }
}

//! Planet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/get/update/delete over the `planetas` table.
//! - Keep every SQL statement inside this module.
//!
//! # Invariants
//! - Write paths bind values from `Planet::to_row()`; the key is never written
//!   on insert and never changed on update.
//! - Update/delete of a missing id is a successful no-op returning `0`.
//! - The repository performs no field validation.
//! - `list_planets` has no `ORDER BY`; callers must not rely on row order.

use crate::db::{DbError, DbHandle};
use crate::model::planet::{
    ColumnValue, Planet, PlanetId, PlanetRow, RowConversionError, COL_ID, PLANET_COLUMNS,
    TABLE_PLANETS,
};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for planet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Update was called with a planet that has never been persisted.
    MissingId,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId => write!(f, "planet has no id; it must be created first"),
            Self::InvalidData(message) => write!(f, "invalid persisted planet data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingId | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RowConversionError> for RepoError {
    fn from(value: RowConversionError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Repository interface for planet CRUD operations.
pub trait PlanetRepository {
    /// Inserts a new row and returns the id assigned by storage.
    fn create_planet(&self, planet: &Planet) -> RepoResult<PlanetId>;
    /// Returns every stored planet, in storage order.
    fn list_planets(&self) -> RepoResult<Vec<Planet>>;
    fn get_planet(&self, id: PlanetId) -> RepoResult<Option<Planet>>;
    /// Replaces all non-key columns; returns affected row count.
    fn update_planet(&self, planet: &Planet) -> RepoResult<usize>;
    /// Returns affected row count.
    fn delete_planet(&self, id: PlanetId) -> RepoResult<usize>;
}

impl<R: PlanetRepository + ?Sized> PlanetRepository for Arc<R> {
    fn create_planet(&self, planet: &Planet) -> RepoResult<PlanetId> {
        (**self).create_planet(planet)
    }

    fn list_planets(&self) -> RepoResult<Vec<Planet>> {
        (**self).list_planets()
    }

    fn get_planet(&self, id: PlanetId) -> RepoResult<Option<Planet>> {
        (**self).get_planet(id)
    }

    fn update_planet(&self, planet: &Planet) -> RepoResult<usize> {
        (**self).update_planet(planet)
    }

    fn delete_planet(&self, id: PlanetId) -> RepoResult<usize> {
        (**self).delete_planet(id)
    }
}

/// SQLite-backed planet repository owning the database handle.
#[derive(Debug)]
pub struct SqlitePlanetRepository {
    db: DbHandle,
}

impl SqlitePlanetRepository {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Opens the database and ensures the schema exists.
    pub fn initialize(&self) -> RepoResult<()> {
        self.db.initialize()?;
        Ok(())
    }

    pub fn db(&self) -> &DbHandle {
        &self.db
    }
}

impl PlanetRepository for SqlitePlanetRepository {
    fn create_planet(&self, planet: &Planet) -> RepoResult<PlanetId> {
        let mut row = planet.to_row();
        row.remove(COL_ID);

        let columns = row.keys().copied().collect::<Vec<_>>();
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {TABLE_PLANETS} ({}) VALUES ({});",
            columns.join(", "),
            placeholders.join(", ")
        );

        let id = self
            .db
            .with_conn(|conn| -> RepoResult<PlanetId> {
                conn.execute(&sql, params_from_iter(row.values()))?;
                Ok(conn.last_insert_rowid())
            })
            .map_err(|err| log_failure("planet_create", err))?;

        debug!("event=planet_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn list_planets(&self) -> RepoResult<Vec<Planet>> {
        let sql = format!("SELECT {} FROM {TABLE_PLANETS};", PLANET_COLUMNS.join(", "));

        let planets = self
            .db
            .with_conn(|conn| query_planets(conn, &sql, &[]))
            .map_err(|err| log_failure("planet_list", err))?;

        debug!(
            "event=planet_list module=repo status=ok count={}",
            planets.len()
        );
        Ok(planets)
    }

    fn get_planet(&self, id: PlanetId) -> RepoResult<Option<Planet>> {
        let sql = format!(
            "SELECT {} FROM {TABLE_PLANETS} WHERE {COL_ID} = ?1;",
            PLANET_COLUMNS.join(", ")
        );

        let mut planets = self
            .db
            .with_conn(|conn| query_planets(conn, &sql, &[&id]))
            .map_err(|err| log_failure("planet_get", err))?;

        Ok(planets.pop())
    }

    fn update_planet(&self, planet: &Planet) -> RepoResult<usize> {
        let id = planet.id.ok_or(RepoError::MissingId)?;

        let mut row = planet.to_row();
        row.remove(COL_ID);

        let assignments = row
            .keys()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>();
        let sql = format!(
            "UPDATE {TABLE_PLANETS} SET {} WHERE {COL_ID} = ?{};",
            assignments.join(", "),
            assignments.len() + 1
        );

        let mut bind_values = row.into_values().collect::<Vec<_>>();
        bind_values.push(ColumnValue::Integer(id));

        let changed = self
            .db
            .with_conn(|conn| -> RepoResult<usize> {
                Ok(conn.execute(&sql, params_from_iter(bind_values.iter()))?)
            })
            .map_err(|err| log_failure("planet_update", err))?;

        debug!("event=planet_update module=repo status=ok id={id} changed={changed}");
        Ok(changed)
    }

    fn delete_planet(&self, id: PlanetId) -> RepoResult<usize> {
        let sql = format!("DELETE FROM {TABLE_PLANETS} WHERE {COL_ID} = ?1;");

        let changed = self
            .db
            .with_conn(|conn| -> RepoResult<usize> { Ok(conn.execute(&sql, [id])?) })
            .map_err(|err| log_failure("planet_delete", err))?;

        debug!("event=planet_delete module=repo status=ok id={id} changed={changed}");
        Ok(changed)
    }
}

fn query_planets(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> RepoResult<Vec<Planet>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut planets = Vec::new();

    while let Some(row) = rows.next()? {
        planets.push(parse_planet_row(row)?);
    }

    Ok(planets)
}

fn parse_planet_row(row: &Row<'_>) -> RepoResult<Planet> {
    let mut flat = PlanetRow::new();
    for column in PLANET_COLUMNS {
        let value: Value = row.get(column)?;
        flat.insert(column, ColumnValue::from(value));
    }
    Ok(Planet::from_row(&flat)?)
}

fn log_failure(event: &'static str, err: RepoError) -> RepoError {
    error!("event={event} module=repo status=error error={err}");
    err
}

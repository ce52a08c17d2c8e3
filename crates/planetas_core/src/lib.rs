//! Core domain logic for the Planetas app.
//! This crate is the single source of truth for planet records and storage.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbError, DbHandle, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::planet::{ColumnValue, Planet, PlanetId, PlanetRow, RowConversionError};
pub use model::validation::{
    validate_planet_form, PlanetField, PlanetForm, PlanetFormErrors, PlanetValidationError,
};
pub use repo::planet_repo::{PlanetRepository, RepoError, RepoResult, SqlitePlanetRepository};
pub use service::planet_list::{PlanetListModel, SubscriptionId};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

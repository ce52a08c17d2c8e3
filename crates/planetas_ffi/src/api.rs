//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the planet list, add, edit and delete flows to Dart via FRB.
//! - Apply form validation before any store call.
//! - Hold the one process-wide `PlanetListModel`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutating response carries the reloaded list, so the UI never
//!   renders a list older than its last completed call.

use log::warn;
use planetas_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DbHandle, Planet, PlanetForm, PlanetFormErrors, PlanetListModel, RepoError,
    SqlitePlanetRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "planetas.sqlite3";
const DB_PATH_ENV: &str = "PLANETAS_DB_PATH";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static PLANET_MODEL: OnceLock<PlanetListModel<SqlitePlanetRepository>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One planet row for list and detail screens.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetItem {
    pub id: i64,
    pub name: String,
    pub distance_from_sun: f64,
    pub size: f64,
    pub nickname: Option<String>,
}

/// Inline message for one rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanetFieldError {
    /// `name|distance_from_sun|size`.
    pub field: String,
    pub message: String,
}

/// Response envelope for list reloads.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetListResponse {
    pub ok: bool,
    pub items: Vec<PlanetItem>,
    pub message: String,
}

/// Response envelope for add/update/remove.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetActionResponse {
    /// Whether the operation reached the store and succeeded.
    pub ok: bool,
    /// Created or targeted planet id.
    pub planet_id: Option<i64>,
    /// Rows touched; `0` for update/remove of a missing id.
    pub affected_rows: u32,
    /// Non-empty only when form validation rejected the input.
    pub field_errors: Vec<PlanetFieldError>,
    /// List after the trailing reload; empty on failure.
    pub items: Vec<PlanetItem>,
    pub message: String,
}

impl PlanetActionResponse {
    fn success(message: impl Into<String>, planet_id: i64, affected_rows: usize) -> Self {
        Self {
            ok: true,
            planet_id: Some(planet_id),
            affected_rows: u32::try_from(affected_rows).unwrap_or(u32::MAX),
            field_errors: Vec::new(),
            items: current_items(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, planet_id: Option<i64>) -> Self {
        Self {
            ok: false,
            planet_id,
            affected_rows: 0,
            field_errors: Vec::new(),
            items: Vec::new(),
            message: message.into(),
        }
    }

    fn invalid(errors: &PlanetFormErrors, planet_id: Option<i64>) -> Self {
        Self {
            field_errors: errors
                .errors()
                .iter()
                .map(|error| PlanetFieldError {
                    field: error.field().as_str().to_string(),
                    message: error.message().to_string(),
                })
                .collect(),
            ..Self::failure(errors.to_string(), planet_id)
        }
    }
}

/// Reloads every planet from the store.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planets_load() -> PlanetListResponse {
    match model().load() {
        Ok(()) => {
            let items = current_items();
            let message = if items.is_empty() {
                "Nenhum planeta cadastrado.".to_string()
            } else {
                format!("{} planeta(s).", items.len())
            };
            PlanetListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => PlanetListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("planets_load", &err),
        },
    }
}

/// Validates form input and creates a planet.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Invalid input returns `field_errors` and never reaches the store.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planet_add(
    name: String,
    distance_from_sun: String,
    size: String,
    nickname: String,
) -> PlanetActionResponse {
    let form = PlanetForm {
        name,
        distance_from_sun,
        size,
        nickname,
    };
    let planet = match form.to_draft() {
        Ok(planet) => planet,
        Err(errors) => return PlanetActionResponse::invalid(&errors, None),
    };

    match model().add(&planet) {
        Ok(id) => PlanetActionResponse::success("Planeta adicionado.", id, 1),
        Err(err) => PlanetActionResponse::failure(failure_message("planet_add", &err), None),
    }
}

/// Validates form input and replaces the planet with `id`.
///
/// # FFI contract
/// - A missing `id` is not an error: `ok=true`, `affected_rows=0`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planet_update(
    id: i64,
    name: String,
    distance_from_sun: String,
    size: String,
    nickname: String,
) -> PlanetActionResponse {
    let form = PlanetForm {
        name,
        distance_from_sun,
        size,
        nickname,
    };
    let planet = match form.to_update(id) {
        Ok(planet) => planet,
        Err(errors) => return PlanetActionResponse::invalid(&errors, Some(id)),
    };

    match model().update_record(&planet) {
        Ok(changed) => PlanetActionResponse::success("Planeta atualizado.", id, changed),
        Err(err) => {
            PlanetActionResponse::failure(failure_message("planet_update", &err), Some(id))
        }
    }
}

/// Deletes the planet with `id`.
///
/// # FFI contract
/// - A missing `id` is not an error: `ok=true`, `affected_rows=0`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planet_remove(id: i64) -> PlanetActionResponse {
    match model().remove(id) {
        Ok(changed) => PlanetActionResponse::success("Planeta removido.", id, changed),
        Err(err) => {
            PlanetActionResponse::failure(failure_message("planet_remove", &err), Some(id))
        }
    }
}

fn model() -> &'static PlanetListModel<SqlitePlanetRepository> {
    PLANET_MODEL.get_or_init(|| {
        PlanetListModel::new(SqlitePlanetRepository::new(DbHandle::file(
            resolve_db_path(),
        )))
    })
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn current_items() -> Vec<PlanetItem> {
    model()
        .snapshot()
        .into_iter()
        .filter_map(to_planet_item)
        .collect()
}

fn to_planet_item(planet: Planet) -> Option<PlanetItem> {
    Some(PlanetItem {
        id: planet.id?,
        name: planet.name,
        distance_from_sun: planet.distance_from_sun,
        size: planet.size,
        nickname: planet.nickname,
    })
}

fn failure_message(operation: &str, err: &RepoError) -> String {
    warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
    format!("{operation} failed: {err}")
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, planet_add, planet_remove, planet_update,
        planets_load,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/planetas-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn planet_add_returns_reloaded_list() {
        let name = unique_token("add");
        let response = planet_add(
            name.clone(),
            "149.6".to_string(),
            "1".to_string(),
            "Planeta azul".to_string(),
        );
        assert!(response.ok, "{}", response.message);
        let id = response.planet_id.expect("add should return planet_id");

        let created = response
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("created planet should be listed");
        assert_eq!(created.name, name);
        assert_eq!(created.nickname.as_deref(), Some("Planeta azul"));

        let loaded = planets_load();
        assert!(loaded.ok, "{}", loaded.message);
        assert!(loaded.items.iter().any(|item| item.id == id));
    }

    #[test]
    fn planet_add_rejects_invalid_form_without_touching_store() {
        let name = unique_token("invalid");
        let response = planet_add(
            name.clone(),
            "0".to_string(),
            "abc".to_string(),
            String::new(),
        );
        assert!(!response.ok);
        assert_eq!(response.planet_id, None);
        let fields = response
            .field_errors
            .iter()
            .map(|error| error.field.as_str())
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["distance_from_sun", "size"]);

        let loaded = planets_load();
        assert!(!loaded.items.iter().any(|item| item.name == name));
    }

    #[test]
    fn planet_update_and_remove_round_trip() {
        let response = planet_add(
            unique_token("edit"),
            "57.9".to_string(),
            "0.38".to_string(),
            String::new(),
        );
        let id = response.planet_id.expect("add should return planet_id");

        let renamed = unique_token("edited");
        let updated = planet_update(
            id,
            renamed.clone(),
            "58".to_string(),
            "0.4".to_string(),
            String::new(),
        );
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.affected_rows, 1);
        let item = updated.items.iter().find(|item| item.id == id).unwrap();
        assert_eq!(item.name, renamed);
        assert_eq!(item.distance_from_sun, 58.0);

        let removed = planet_remove(id);
        assert!(removed.ok, "{}", removed.message);
        assert_eq!(removed.affected_rows, 1);
        assert!(!removed.items.iter().any(|item| item.id == id));

        let removed_again = planet_remove(id);
        assert!(removed_again.ok);
        assert_eq!(removed_again.affected_rows, 0);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}

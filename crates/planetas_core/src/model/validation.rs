//! Planet form input validation.
//!
//! # Responsibility
//! - Turn raw add/edit form text into a `Planet` draft.
//! - Report every failing field at once so the form can show inline messages.
//!
//! # Invariants
//! - A draft returned by `validate_planet_form` has a non-empty name and
//!   finite, strictly positive distance and size.
//! - Empty (or whitespace-only) nickname input becomes `None`.
//! - Validation never touches storage.

use crate::model::planet::{Planet, PlanetId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Form field addressed by a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlanetField {
    Name,
    DistanceFromSun,
    Size,
}

impl PlanetField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DistanceFromSun => "distance_from_sun",
            Self::Size => "size",
        }
    }
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanetValidationError {
    EmptyName,
    InvalidDistance(String),
    NonPositiveDistance,
    InvalidSize(String),
    NonPositiveSize,
}

impl PlanetValidationError {
    pub fn field(&self) -> PlanetField {
        match self {
            Self::EmptyName => PlanetField::Name,
            Self::InvalidDistance(_) | Self::NonPositiveDistance => PlanetField::DistanceFromSun,
            Self::InvalidSize(_) | Self::NonPositiveSize => PlanetField::Size,
        }
    }

    /// Inline label shown next to the field.
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyName => "Por favor, insira o nome do planeta",
            Self::InvalidDistance(_) => "Por favor, insira uma distância válida",
            Self::NonPositiveDistance => "A distância deve ser maior que zero",
            Self::InvalidSize(_) => "Por favor, insira um tamanho válido",
            Self::NonPositiveSize => "O tamanho deve ser maior que zero",
        }
    }
}

impl Display for PlanetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::InvalidDistance(raw) => write!(f, "distance_from_sun `{raw}` is not a number"),
            Self::NonPositiveDistance => write!(f, "distance_from_sun must be > 0"),
            Self::InvalidSize(raw) => write!(f, "size `{raw}` is not a number"),
            Self::NonPositiveSize => write!(f, "size must be > 0"),
        }
    }
}

impl Error for PlanetValidationError {}

/// All field errors of one form submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanetFormErrors {
    errors: Vec<PlanetValidationError>,
}

impl PlanetFormErrors {
    pub fn errors(&self) -> &[PlanetValidationError] {
        &self.errors
    }

    /// Error for one field, if that field was rejected.
    pub fn for_field(&self, field: PlanetField) -> Option<&PlanetValidationError> {
        self.errors.iter().find(|error| error.field() == field)
    }
}

impl Display for PlanetFormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid planet input: {joined}")
    }
}

impl Error for PlanetFormErrors {}

/// Raw text captured by the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanetForm {
    pub name: String,
    pub distance_from_sun: String,
    pub size: String,
    pub nickname: String,
}

impl PlanetForm {
    /// Validates the form into an unpersisted planet.
    pub fn to_draft(&self) -> Result<Planet, PlanetFormErrors> {
        validate_planet_form(self)
    }

    /// Validates the form into an update for the planet with `id`.
    pub fn to_update(&self, id: PlanetId) -> Result<Planet, PlanetFormErrors> {
        let mut planet = validate_planet_form(self)?;
        planet.id = Some(id);
        Ok(planet)
    }
}

/// Applies the form rules and builds a draft planet (id absent).
pub fn validate_planet_form(form: &PlanetForm) -> Result<Planet, PlanetFormErrors> {
    let mut errors = Vec::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.push(PlanetValidationError::EmptyName);
    }

    let distance = parse_positive(
        &form.distance_from_sun,
        PlanetValidationError::InvalidDistance,
        PlanetValidationError::NonPositiveDistance,
    )
    .map_err(|err| errors.push(err))
    .ok();

    let size = parse_positive(
        &form.size,
        PlanetValidationError::InvalidSize,
        PlanetValidationError::NonPositiveSize,
    )
    .map_err(|err| errors.push(err))
    .ok();

    match (distance, size) {
        (Some(distance_from_sun), Some(size)) if errors.is_empty() => {
            let nickname = form.nickname.trim();
            Ok(Planet {
                id: None,
                name: name.to_string(),
                distance_from_sun,
                size,
                nickname: (!nickname.is_empty()).then(|| nickname.to_string()),
            })
        }
        _ => Err(PlanetFormErrors { errors }),
    }
}

fn parse_positive(
    raw: &str,
    invalid: fn(String) -> PlanetValidationError,
    non_positive: PlanetValidationError,
) -> Result<f64, PlanetValidationError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| invalid(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(invalid(trimmed.to_string()));
    }
    if value <= 0.0 {
        return Err(non_positive);
    }
    Ok(value)
}

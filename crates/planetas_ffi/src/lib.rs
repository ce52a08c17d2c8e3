//! Flutter bridge for the Planetas core.

pub mod api;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the state the presentation layer
//!   observes.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod planet_list;

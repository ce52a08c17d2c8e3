//! Planet domain model.
//!
//! # Responsibility
//! - Define the planet record and its flat row mapping.
//! - Define the add/edit form rules applied before a record reaches storage.
//!
//! # Invariants
//! - Every persisted planet is identified by a store-assigned integer id.
//! - Deletion is a hard delete; there are no tombstones.

pub mod planet;
pub mod validation;

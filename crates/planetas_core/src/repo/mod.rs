//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the planet data access contract.
//! - Isolate SQLite query details from the list model and FFI callers.
//!
//! # Invariants
//! - This layer is the only code that issues SQL against `planetas`.
//! - Not-found on update/delete is reported as zero affected rows, not as an
//!   error.

pub mod planet_repo;

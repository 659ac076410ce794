//! Domain model for projects, accounts and their edit history.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own pure state transitions (undo/redo, soft delete, tag normalization).
//!
//! # Invariants
//! - Every account, project and edit is identified by a stable UUID.
//! - Project deletion is a soft-delete flag, never a row removal.
//! - Model code performs no I/O; persistence lives in `repo`.

pub mod account;
pub mod analysis;
pub mod edit;
pub mod project;
pub mod tag;

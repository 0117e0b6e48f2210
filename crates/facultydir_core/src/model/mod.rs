//! Directory domain model: departments, faculty and publications.
//!
//! # Responsibility
//! - Define canonical records reconciled by the importer.
//! - Keep relationship sets as true sets; ordering is a store concern.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID assigned on creation.
//! - Import never removes entities or relationship members.

pub mod department;
pub mod faculty;
pub mod publication;

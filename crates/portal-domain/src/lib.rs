//! Domain types shared across College Portal services.
//!
//! Pure types with no framework dependencies, usable from every layer.

pub mod pagination;
pub mod phone;
pub mod role;

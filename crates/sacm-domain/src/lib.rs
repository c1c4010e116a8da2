//! Domain types shared across S-ACM crates.
//!
//! Pure types with no framework dependencies.

pub mod pagination;
pub mod user;

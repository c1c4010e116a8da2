//! Test utilities for S-ACM services.
//!
//! Import from dev-dependencies only, never in production code.

pub mod auth;

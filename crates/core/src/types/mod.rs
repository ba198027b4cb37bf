//! Core types for Atlas.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod country;
pub mod email;
pub mod id;
pub mod username;

pub use country::{CountryCode, CountryCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use username::{Username, UsernameError};

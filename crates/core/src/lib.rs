//! Core domain types and shared logic for the wisp sharing service.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Share token generation
//! - The expiration policy shared by links and uploads
//! - Configuration types
//! - Duration parsing for expiry windows

pub mod config;
pub mod error;
pub mod expiry;
pub mod token;

pub use error::{Error, Result};
pub use expiry::{parse_expire_clicks, parse_expire_in, Expirable};
pub use token::{generate, DEFAULT_TOKEN_LENGTH, TOKEN_ALPHABET};

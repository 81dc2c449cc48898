//! Storage layer for aa2
//!
//! Configuration profiles (TOML) and environment overrides for secrets.

use crate::error::StorageError;

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, StorageError>;

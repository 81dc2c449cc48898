//! Input validation and sanitization utilities
//!
//! This module provides utilities for validating configuration values and
//! report parameters before they reach the API.

use crate::error::{ConfigError, InputError};

/// Validate that a URL is properly formatted
pub fn validate_url(field: &str, url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: url.to_string(),
            reason: "URL cannot be empty".to_string(),
        }
        .into());
    }

    // Basic URL validation - must start with http:// or https://
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: url.to_string(),
            reason: "URL must start with http:// or https://".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Check the freeform report argument counts
pub fn validate_freeform_counts(
    dimensions: usize,
    metrics: usize,
    segments: usize,
) -> Result<(), InputError> {
    if dimensions == 0 {
        return Err(InputError::NoDimensions);
    }
    if metrics == 0 {
        return Err(InputError::NoMetrics);
    }
    if dimensions > 2 {
        return Err(InputError::TooManyDimensions { count: dimensions });
    }
    if segments > 1 {
        return Err(InputError::TooManySegments { count: segments });
    }
    Ok(())
}

//! # aa2-core
//!
//! Core library for the Analytics 2.0 reporting API.
//!
//! Authenticates through a signed JWT exchange, discovers the global company
//! id, lists report metadata and assembles one- or two-dimension freeform
//! reports into a flat [`core::table::ResultTable`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aa2_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> aa2_core::Result<()> {
//!     let service = ConfigService::new(Config::load(None)?);
//!     let settings = service.resolve_settings(None)?;
//!
//!     let client = AnalyticsClient::new()?;
//!     let session = AuthService::new(&client, &settings).authenticate().await?;
//!
//!     let request = FreeformRequest::new(
//!         vec!["variables/page".to_string()],
//!         vec!["metrics/visits".to_string()],
//!     );
//!     let report = ReportService::new(&client, &session);
//!     let table = FreeformService::new(report).run(&request).await?;
//!     println!("{}", TableDisplay::new().render_result_table(&table));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           API Layer                 │  HTTP client, wire models, JWT, session
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  Report builder, result table, services
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  TOML profiles, environment overrides
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  Validation, text helpers, error conversion
//! └─────────────────────────────────────┘
//! ```

pub use error::AppError;

/// Commonly used types in one import
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::AppError;

    pub use crate::api::client::AnalyticsClient;
    pub use crate::api::session::Session;

    pub use crate::core::report::{DateRange, ReportRequest};
    pub use crate::core::services::auth_service::AuthService;
    pub use crate::core::services::config_service::ConfigService;
    pub use crate::core::services::freeform_service::FreeformService;
    pub use crate::core::services::metadata_service::MetadataService;
    pub use crate::core::services::report_service::{ReportService, ReportSource};
    pub use crate::core::services::types::FreeformRequest;
    pub use crate::core::table::{CellValue, ResultTable};

    pub use crate::storage::config::{Config, Profile, Settings};

    pub use crate::display::{OutputFormat, TableDisplay};
}

/// Business logic layer - report building, result tables and services.
pub mod core;

/// Storage layer - configuration profiles and environment overrides.
pub mod storage;

/// Utilities layer - validation, text helpers and error conversion.
pub mod utils;

/// API layer - HTTP client, wire models, token exchange and session.
pub mod api;

/// Display layer - table, JSON and CSV output.
pub mod display;

/// Hierarchical error system with severity levels and troubleshooting hints.
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

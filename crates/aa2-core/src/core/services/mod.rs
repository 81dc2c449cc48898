pub mod auth_service;
pub mod config_service;
pub mod freeform_service;
pub mod metadata_service;
pub mod report_service;
pub mod types;

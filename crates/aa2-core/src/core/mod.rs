pub mod report;
pub mod search;
pub mod services;
pub mod table;

// Application layer - Use cases consuming the aligned series matrix
pub mod binding_service;
pub mod chart_export;
pub mod csv_export;
pub mod series_repository;
pub mod table_export;

// Domain layer - time series model and alignment
pub mod collection;
pub mod data_point;
pub mod error;
pub mod number_format;
pub mod series;
pub mod timestamp;
pub mod unit;

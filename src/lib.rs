// Time series content binding - aligns heterogeneous series for tables, CSV and charts
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::binding_service::{BindingService, OutputFormat};
pub use domain::collection::SeriesCollection;
pub use domain::data_point::{DataPoint, ValueSlot};
pub use domain::number_format::{DecimalFormat, Locale};
pub use domain::series::{RawSample, SamplePolicy, Series, SeriesDefinition};
pub use domain::timestamp::{Timestamp, TimestampKind};
pub use domain::unit::Unit;

// Repository trait for time series datasets
use crate::domain::series::Series;

pub trait SeriesRepository: Send + Sync {
    /// List the identifiers of all available datasets
    fn list_datasets(&self) -> anyhow::Result<Vec<String>>;

    /// Load every series of a dataset, in document order
    fn load_series(&self, dataset_id: &str) -> anyhow::Result<Vec<Series>>;
}

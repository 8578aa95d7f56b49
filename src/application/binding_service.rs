// Binding service - Use case for rendering a dataset into a page fragment
use crate::application::chart_export::ChartExporter;
use crate::application::csv_export::CsvExporter;
use crate::application::series_repository::SeriesRepository;
use crate::application::table_export::TableExporter;
use crate::domain::collection::SeriesCollection;
use crate::domain::number_format::{DecimalFormat, Locale};
use anyhow::Context;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Chart,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "chart" => Ok(OutputFormat::Chart),
            other => anyhow::bail!("Unknown output format: {}", other),
        }
    }
}

#[derive(Clone)]
pub struct BindingService {
    repository: Arc<dyn SeriesRepository>,
    format: DecimalFormat,
    locale: Locale,
}

impl BindingService {
    pub fn new(repository: Arc<dyn SeriesRepository>, format: DecimalFormat, locale: Locale) -> Self {
        Self {
            repository,
            format,
            locale,
        }
    }

    pub fn list_datasets(&self) -> anyhow::Result<Vec<String>> {
        self.repository.list_datasets()
    }

    /// Load, align and render one dataset. Table output uses the page locale;
    /// CSV and chart output always use a decimal point.
    pub fn render(&self, dataset_id: &str, output: OutputFormat) -> anyhow::Result<String> {
        let series = self
            .repository
            .load_series(dataset_id)
            .with_context(|| format!("Failed to load dataset {}", dataset_id))?;
        let collection = SeriesCollection::new(series.iter().collect());

        tracing::debug!(
            "Rendering dataset {} as {:?}: {} series, {} time markers",
            dataset_id,
            output,
            collection.len(),
            collection.union_marker_count()
        );

        match output {
            OutputFormat::Table => {
                let table = TableExporter::new(self.format.clone())
                    .with_locale(self.locale)
                    .export(&collection);
                Ok(serde_json::to_string_pretty(&table)?)
            }
            OutputFormat::Csv => CsvExporter::new(self.format.clone()).export(&collection),
            OutputFormat::Chart => {
                let config = ChartExporter::new(self.format.clone()).export(&collection);
                Ok(serde_json::to_string_pretty(&config)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{RawSample, SamplePolicy, Series, SeriesDefinition};
    use crate::domain::timestamp::TimestampKind;
    use crate::domain::unit::Unit;

    struct StaticRepository;

    impl SeriesRepository for StaticRepository {
        fn list_datasets(&self) -> anyhow::Result<Vec<String>> {
            Ok(vec!["temperature".to_string()])
        }

        fn load_series(&self, dataset_id: &str) -> anyhow::Result<Vec<Series>> {
            if dataset_id != "temperature" {
                anyhow::bail!("no such dataset");
            }
            let definition = SeriesDefinition {
                id: "ny-alesund".to_string(),
                title: "Ny-Ålesund".to_string(),
                unit: Unit::new("°C", "Degrees Celsius"),
                timestamp_kind: TimestampKind::Year,
                locale: Locale::Norwegian,
            };
            let samples = vec![RawSample::new(-4.5, "2000"), RawSample::new(-3.75, "2001")];
            Ok(vec![Series::from_samples(definition, samples, SamplePolicy::Skip)?])
        }
    }

    fn service(locale: Locale) -> BindingService {
        BindingService::new(Arc::new(StaticRepository), DecimalFormat::default(), locale)
    }

    #[test]
    fn test_render_table_uses_page_locale() {
        let out = service(Locale::Norwegian)
            .render("temperature", OutputFormat::Table)
            .unwrap();
        assert!(out.contains("\"-3,75\""));
    }

    #[test]
    fn test_render_csv() {
        let out = service(Locale::Norwegian)
            .render("temperature", OutputFormat::Csv)
            .unwrap();
        assert!(out.starts_with("time;Ny-Ålesund (°C)\n"));
        assert!(out.contains("2001;-3.75"));
    }

    #[test]
    fn test_render_chart() {
        let out = service(Locale::English)
            .render("temperature", OutputFormat::Chart)
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["categories"][1], "2001");
        assert_eq!(json["series"][0]["data"][0], -4.5);
    }

    #[test]
    fn test_unknown_dataset_is_an_error() {
        let err = service(Locale::English)
            .render("missing", OutputFormat::Csv)
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}

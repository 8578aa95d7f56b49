// JSON dataset repository implementation
use crate::application::series_repository::SeriesRepository;
use crate::domain::number_format::Locale;
use crate::domain::series::{
    DashStyle, RawSample, RawValue, RawWhen, SamplePolicy, Series, SeriesDefinition,
    TREND_LINE_COLOR,
};
use crate::domain::timestamp::TimestampKind;
use crate::domain::unit::Unit;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
    policy: SamplePolicy,
    trend_line_color: String,
}

#[derive(Debug, Deserialize)]
struct DatasetDocument {
    series: Vec<SeriesDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesDocument {
    id: String,
    #[serde(default)]
    title: TitleDocument,
    #[serde(default)]
    unit: Unit,
    #[serde(default)]
    timestamp_kind: Option<String>,
    #[serde(default)]
    locale: Option<Locale>,
    #[serde(default)]
    trend_line: bool,
    #[serde(default)]
    style: Option<StyleDocument>,
    #[serde(default)]
    data: Vec<SampleDocument>,
}

/// A plain title, or titles keyed by locale tag (`{"en": ..., "nb": ...}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TitleDocument {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl Default for TitleDocument {
    fn default() -> Self {
        TitleDocument::Plain(String::new())
    }
}

impl TitleDocument {
    /// Pick the title for `locale`, then English, then the first entry.
    fn resolve(self, locale: Locale) -> String {
        let titles = match self {
            TitleDocument::Plain(title) => return title,
            TitleDocument::Localized(titles) => titles,
        };
        let lookup = |wanted: Locale| {
            titles
                .iter()
                .find(|(tag, _)| tag.parse::<Locale>().ok() == Some(wanted))
                .map(|(_, title)| title.clone())
        };
        lookup(locale)
            .or_else(|| lookup(Locale::English))
            .or_else(|| titles.values().next().cloned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleDocument {
    color: Option<String>,
    line_thickness: Option<f32>,
    marker_visible: Option<bool>,
    marker_thickness: Option<f32>,
    dash_style: Option<DashStyle>,
    connect_nulls: Option<bool>,
}

/// Fields stay untyped so a single bad sample cannot fail the document.
#[derive(Debug, Deserialize)]
struct SampleDocument {
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    when: serde_json::Value,
    #[serde(default)]
    low: serde_json::Value,
    #[serde(default)]
    high: serde_json::Value,
    #[serde(default)]
    min: serde_json::Value,
    #[serde(default)]
    max: serde_json::Value,
}

impl JsonFileRepository {
    pub fn new(root: impl Into<PathBuf>, policy: SamplePolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            trend_line_color: TREND_LINE_COLOR.to_string(),
        }
    }

    pub fn with_trend_line_color(mut self, color: impl Into<String>) -> Self {
        self.trend_line_color = color.into();
        self
    }

    fn dataset_path(&self, dataset_id: &str) -> Result<PathBuf> {
        if dataset_id.is_empty() || dataset_id.contains(['/', '\\']) || dataset_id.starts_with('.') {
            anyhow::bail!("Invalid dataset id: {:?}", dataset_id);
        }
        Ok(self.root.join(format!("{}.json", dataset_id)))
    }
}

impl SeriesRepository for JsonFileRepository {
    fn list_datasets(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read data directory {}", self.root.display()))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();

        Ok(ids)
    }

    fn load_series(&self, dataset_id: &str) -> Result<Vec<Series>> {
        let path = self.dataset_path(dataset_id)?;
        load_document(&path, self.policy, &self.trend_line_color)
    }
}

/// Read and convert one dataset document.
pub fn load_document(
    path: &Path,
    policy: SamplePolicy,
    trend_line_color: &str,
) -> Result<Vec<Series>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    parse_document(&body, policy, trend_line_color)
        .with_context(|| format!("Invalid dataset {}", path.display()))
}

pub fn parse_document(
    body: &str,
    policy: SamplePolicy,
    trend_line_color: &str,
) -> Result<Vec<Series>> {
    let document: DatasetDocument =
        serde_json::from_str(body).context("Failed to parse dataset document")?;

    let mut series = Vec::with_capacity(document.series.len());
    for doc in document.series {
        series.push(series_from_document(doc, policy, trend_line_color)?);
    }

    tracing::debug!("Loaded {} series from dataset document", series.len());
    Ok(series)
}

fn series_from_document(
    doc: SeriesDocument,
    policy: SamplePolicy,
    trend_line_color: &str,
) -> Result<Series> {
    let locale = doc.locale.unwrap_or_default();
    let definition = SeriesDefinition {
        id: doc.id,
        title: doc.title.resolve(locale),
        unit: doc.unit,
        timestamp_kind: doc
            .timestamp_kind
            .as_deref()
            .map(TimestampKind::from_indicator)
            .unwrap_or_default(),
        locale,
    };

    let samples = doc.data.iter().map(raw_sample);
    let mut series = Series::from_samples(definition, samples, policy)?;

    if let Some(style) = doc.style {
        if let Some(color) = &style.color {
            series.set_color(color);
        }
        if let Some(thickness) = style.line_thickness {
            series.set_line_thickness(thickness);
        }
        if let Some(visible) = style.marker_visible {
            series.set_marker_visible(visible);
        }
        if let Some(thickness) = style.marker_thickness {
            series.set_marker_thickness(thickness);
        }
        if let Some(dash_style) = style.dash_style {
            series.set_dash_style(dash_style);
        }
        if let Some(connect_nulls) = style.connect_nulls {
            series.set_connect_nulls(connect_nulls);
        }
    }
    if doc.trend_line {
        series.flag_as_trend_line_with(trend_line_color);
    }

    Ok(series)
}

fn raw_sample(doc: &SampleDocument) -> RawSample {
    RawSample {
        value: raw_value(&doc.value),
        when: raw_when(&doc.when),
        low: raw_value(&doc.low),
        high: raw_value(&doc.high),
        min: raw_value(&doc.min),
        max: raw_value(&doc.max),
    }
}

fn raw_value(value: &serde_json::Value) -> Option<RawValue> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number),
        serde_json::Value::String(s) => Some(RawValue::Text(s.clone())),
        _ => None,
    }
}

fn raw_when(value: &serde_json::Value) -> Option<RawWhen> {
    match value {
        serde_json::Value::String(s) => Some(RawWhen::Text(s.clone())),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(RawWhen::Integer(i)),
            None => Some(RawWhen::Text(n.to_string())),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r##"{
        "series": [
            {
                "id": "extent",
                "title": "Sea ice extent",
                "unit": { "symbol": "km²", "label": "Square kilometres" },
                "timestampKind": "year",
                "locale": "nb",
                "style": { "color": "#1f77b4", "dashStyle": "Dash", "lineThickness": 3 },
                "data": [
                    { "value": 6.5, "when": 2000, "low": 6.1, "high": 6.9 },
                    { "value": "6.25", "when": "2001", "low": "5.9", "high": "6.6" },
                    { "value": null, "when": "2002" },
                    { "value": true, "when": "2003" }
                ]
            },
            {
                "id": "trend",
                "title": "Trend",
                "unit": { "symbol": "km²", "label": "Square kilometres" },
                "trendLine": true,
                "data": [ { "value": 6.4, "when": "2000" }, { "value": 6.3, "when": "2001" } ]
            },
            {
                "id": "season",
                "unit": { "symbol": "d" },
                "data": [ { "value": 120, "when": "2007/2008" } ]
            }
        ]
    }"##;

    #[test]
    fn test_parse_document() {
        let series = parse_document(DOCUMENT, SamplePolicy::Skip, TREND_LINE_COLOR).unwrap();
        assert_eq!(series.len(), 3);

        let extent = &series[0];
        assert_eq!(extent.len(), 2);
        assert_eq!(extent.skipped_samples(), 2);
        assert!(extent.is_error_bar_series());
        assert_eq!(extent.locale(), Locale::Norwegian);
        assert_eq!(extent.style().color(), Some("#1f77b4"));
        assert_eq!(extent.style().dash_style(), DashStyle::Dash);
        assert_eq!(extent.style().line_thickness(), 3.0);
        assert_eq!(extent.points()[0].time_marker(), "2000");

        assert!(series[1].is_trend_line());
        assert_eq!(series[2].points()[0].time_marker(), "2007/2008");
        assert_eq!(series[2].unit().label, "");
    }

    #[test]
    fn test_localized_titles() {
        let body = r#"{
            "series": [
                { "id": "a", "locale": "nb", "title": { "en": "Extent", "nb": "Utbredelse" } },
                { "id": "b", "locale": "nb", "title": { "en": "Area" } },
                { "id": "c", "title": { "de": "Fläche" } }
            ]
        }"#;
        let series = parse_document(body, SamplePolicy::Skip, TREND_LINE_COLOR).unwrap();
        assert_eq!(series[0].title(), "Utbredelse");
        assert_eq!(series[1].title(), "Area");
        assert_eq!(series[2].title(), "Fläche");
    }

    #[test]
    fn test_trend_line_color_override() {
        let series = parse_document(DOCUMENT, SamplePolicy::Skip, "#336699").unwrap();
        assert_eq!(series[1].style().color(), Some("#336699"));
        assert_eq!(series[0].style().color(), Some("#1f77b4"));
    }

    #[test]
    fn test_fail_fast_rejects_document() {
        let err = parse_document(DOCUMENT, SamplePolicy::FailFast, TREND_LINE_COLOR).unwrap_err();
        assert!(format!("{:#}", err).contains("extent"));
    }

    #[test]
    fn test_structural_errors_surface() {
        assert!(parse_document("{\"series\": 3}", SamplePolicy::Skip, TREND_LINE_COLOR).is_err());
        assert!(parse_document("not json", SamplePolicy::Skip, TREND_LINE_COLOR).is_err());
    }

    #[test]
    fn test_file_repository() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sea-ice.json"), DOCUMENT).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let repository = JsonFileRepository::new(dir.path(), SamplePolicy::Skip);
        assert_eq!(repository.list_datasets().unwrap(), vec!["sea-ice"]);
        assert_eq!(repository.load_series("sea-ice").unwrap().len(), 3);
        assert!(repository.load_series("missing").is_err());
        assert!(repository.load_series("../etc/passwd").is_err());

        let tinted = JsonFileRepository::new(dir.path(), SamplePolicy::Skip)
            .with_trend_line_color("#00ff00");
        let series = tinted.load_series("sea-ice").unwrap();
        assert_eq!(series[1].style().color(), Some("#00ff00"));
    }
}

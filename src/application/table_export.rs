// Table export - one row per series value slot, one column per time marker
use crate::domain::collection::SeriesCollection;
use crate::domain::data_point::{DataPoint, ValueSlot};
use crate::domain::number_format::{DecimalFormat, Locale};
use crate::domain::series::Series;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Value,
    LowHigh,
    MinMax,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub series_id: String,
    pub label: String,
    pub kind: RowKind,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub time_markers: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone)]
pub struct TableExporter {
    format: DecimalFormat,
    locale: Option<Locale>,
}

impl TableExporter {
    /// Cells use each point's own display locale unless one is forced.
    pub fn new(format: DecimalFormat) -> Self {
        Self {
            format,
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn export(&self, collection: &SeriesCollection<'_>) -> Table {
        let time_markers: Vec<String> = collection.time_markers().map(str::to_string).collect();
        let mut rows = Vec::new();

        for (column, series) in collection.series().iter().enumerate() {
            if series.is_trend_line() {
                continue;
            }

            let points: Vec<Option<&DataPoint>> = time_markers
                .iter()
                .map(|marker| {
                    collection
                        .data_points_for_time_marker(marker)
                        .and_then(|row| row.get(column).copied().flatten())
                })
                .collect();

            rows.push(self.row(series, series_label(series), RowKind::Value, &points));
            if series.has_low_high() {
                let label = format!("{} low - high", series.title());
                rows.push(self.row(series, label, RowKind::LowHigh, &points));
            }
            if series.has_min_max() {
                let label = format!("{} min - max", series.title());
                rows.push(self.row(series, label, RowKind::MinMax, &points));
            }
        }

        Table { time_markers, rows }
    }

    fn row(
        &self,
        series: &Series,
        label: String,
        kind: RowKind,
        points: &[Option<&DataPoint>],
    ) -> TableRow {
        let cells = points
            .iter()
            .map(|point| match point {
                Some(point) => self.cell(point, kind),
                None => String::new(),
            })
            .collect();

        TableRow {
            series_id: series.id().to_string(),
            label,
            kind,
            cells,
        }
    }

    fn cell(&self, point: &DataPoint, kind: RowKind) -> String {
        let locale = self.locale.unwrap_or(point.locale());
        let value = |slot| point.get_formatted_in(slot, &self.format, locale);
        match kind {
            RowKind::Value => value(ValueSlot::Main),
            RowKind::LowHigh if point.has_low_high() => {
                format!("{} - {}", value(ValueSlot::Low), value(ValueSlot::High))
            }
            RowKind::MinMax if point.has_min_max() => {
                format!("{} - {}", value(ValueSlot::Min), value(ValueSlot::Max))
            }
            _ => String::new(),
        }
    }
}

/// "Title (symbol)", or just the title for unitless series.
pub fn series_label(series: &Series) -> String {
    let symbol = &series.unit().symbol;
    if symbol.is_empty() {
        series.title().to_string()
    } else {
        format!("{} ({})", series.title(), symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{RawSample, SamplePolicy, SeriesDefinition};
    use crate::domain::timestamp::TimestampKind;
    use crate::domain::unit::Unit;

    fn series(id: &str, locale: Locale, samples: Vec<RawSample>) -> Series {
        let definition = SeriesDefinition {
            id: id.to_string(),
            title: format!("Station {}", id),
            unit: Unit::new("°C", "Degrees Celsius"),
            timestamp_kind: TimestampKind::Year,
            locale,
        };
        Series::from_samples(definition, samples, SamplePolicy::Skip).unwrap()
    }

    #[test]
    fn test_rows_and_empty_cells() {
        let a = series(
            "a",
            Locale::English,
            vec![RawSample::new(1.5, "2000"), RawSample::new(2.0, "2001")],
        );
        let b = series("b", Locale::English, vec![RawSample::new(3.25, "2001")]);
        let collection = SeriesCollection::new(vec![&a, &b]);

        let table = TableExporter::new(DecimalFormat::default()).export(&collection);
        assert_eq!(table.time_markers, vec!["2000", "2001"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "Station a (°C)");
        assert_eq!(table.rows[0].cells, vec!["1.5", "2"]);
        assert_eq!(table.rows[1].cells, vec!["", "3.25"]);
    }

    #[test]
    fn test_bound_rows() {
        let a = series(
            "a",
            Locale::English,
            vec![
                RawSample::new(2.0, "2000").with_low_high(1.0, 3.0),
                RawSample::new(2.5, "2001"),
            ],
        );
        let collection = SeriesCollection::new(vec![&a]);

        let table = TableExporter::new(DecimalFormat::default()).export(&collection);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].kind, RowKind::LowHigh);
        assert_eq!(table.rows[1].label, "Station a low - high");
        assert_eq!(table.rows[1].cells, vec!["1 - 3", ""]);
    }

    #[test]
    fn test_trend_lines_skipped() {
        let a = series("a", Locale::English, vec![RawSample::new(1.0, "2000")]);
        let mut trend = series("trend", Locale::English, vec![RawSample::new(1.1, "2000")]);
        trend.flag_as_trend_line();
        let collection = SeriesCollection::new(vec![&a, &trend]);

        let table = TableExporter::new(DecimalFormat::default()).export(&collection);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].series_id, "a");
    }

    #[test]
    fn test_point_locale_and_override() {
        let a = series("a", Locale::Norwegian, vec![RawSample::new(1.5, "2000")]);
        let collection = SeriesCollection::new(vec![&a]);

        let table = TableExporter::new(DecimalFormat::default()).export(&collection);
        assert_eq!(table.rows[0].cells, vec!["1,5"]);

        let table = TableExporter::new(DecimalFormat::default())
            .with_locale(Locale::English)
            .export(&collection);
        assert_eq!(table.rows[0].cells, vec!["1.5"]);
    }
}

// Chart export - serializable chart configuration built from an aligned collection
use crate::domain::collection::SeriesCollection;
use crate::domain::data_point::{DataPoint, ValueSlot};
use crate::domain::number_format::DecimalFormat;
use crate::domain::series::{DashStyle, Series};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSeriesKind {
    Line,
    ErrorBar,
}

/// A plotted value: a single number, or a `[low, high]` band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartPoint {
    Value(f64),
    Range(f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub enabled: bool,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub symbol: String,
    pub title: String,
    pub allow_decimals: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub opposite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChartSeriesKind,
    pub y_axis: usize,
    pub data: Vec<Option<ChartPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub line_width: f32,
    pub dash_style: DashStyle,
    pub marker: Marker,
    pub connect_nulls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub categories: Vec<String>,
    pub y_axes: Vec<YAxis>,
    pub series: Vec<ChartSeries>,
}

/// Builds chart configuration: one y-axis per distinct unit, one series per
/// member and an extra `errorbar` series for each error-bar member.
#[derive(Debug, Clone)]
pub struct ChartExporter {
    format: DecimalFormat,
}

impl ChartExporter {
    pub fn new(format: DecimalFormat) -> Self {
        Self { format }
    }

    pub fn export(&self, collection: &SeriesCollection<'_>) -> ChartConfig {
        let categories: Vec<String> = collection.time_markers().map(str::to_string).collect();

        let y_axes = collection
            .units()
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                let members = collection.series_with_unit(unit);
                YAxis {
                    symbol: unit.symbol.clone(),
                    title: unit.display_name().to_string(),
                    allow_decimals: members.iter().any(|s| !s.is_integral()),
                    min: members.iter().filter_map(|s| s.min_value()).reduce(f64::min),
                    max: members.iter().filter_map(|s| s.max_value()).reduce(f64::max),
                    opposite: index % 2 == 1,
                }
            })
            .collect();

        let mut series = Vec::new();
        for (column, member) in collection.series().iter().enumerate() {
            let y_axis = collection
                .units()
                .iter()
                .position(|u| u == member.unit())
                .unwrap_or(0);
            let points: Vec<Option<&DataPoint>> = categories
                .iter()
                .map(|marker| {
                    collection
                        .data_points_for_time_marker(marker)
                        .and_then(|row| row.get(column).copied().flatten())
                })
                .collect();

            let data = points
                .iter()
                .map(|p| p.map(|p| ChartPoint::Value(self.format.round(p.value()))))
                .collect();
            series.push(self.line_series(member, y_axis, data));

            if member.is_error_bar_series() {
                let bands = points
                    .iter()
                    .map(|p| {
                        p.filter(|p| p.has_low_high()).map(|p| {
                            ChartPoint::Range(
                                self.format.round(p.get(ValueSlot::Low)),
                                self.format.round(p.get(ValueSlot::High)),
                            )
                        })
                    })
                    .collect();
                series.push(self.error_bar_series(member, y_axis, bands));
            }
        }

        tracing::debug!(
            "Chart config: {} categories, {} axes, {} series",
            categories.len(),
            collection.units().len(),
            series.len()
        );

        ChartConfig {
            categories,
            y_axes,
            series,
        }
    }

    fn line_series(
        &self,
        member: &Series,
        y_axis: usize,
        data: Vec<Option<ChartPoint>>,
    ) -> ChartSeries {
        let style = member.style();
        ChartSeries {
            id: member.id().to_string(),
            name: member.title().to_string(),
            kind: ChartSeriesKind::Line,
            y_axis,
            data,
            color: style.color().map(str::to_string),
            line_width: style.line_thickness(),
            dash_style: style.dash_style(),
            marker: Marker {
                enabled: style.marker_visible(),
                radius: style.marker_thickness(),
            },
            connect_nulls: style.connect_nulls(),
            linked_to: None,
        }
    }

    fn error_bar_series(
        &self,
        member: &Series,
        y_axis: usize,
        data: Vec<Option<ChartPoint>>,
    ) -> ChartSeries {
        let style = member.style();
        ChartSeries {
            id: format!("{}-errorbar", member.id()),
            name: format!("{} low - high", member.title()),
            kind: ChartSeriesKind::ErrorBar,
            y_axis,
            data,
            color: style.color().map(str::to_string),
            line_width: 1.0,
            dash_style: DashStyle::Solid,
            marker: Marker {
                enabled: false,
                radius: 0.0,
            },
            connect_nulls: false,
            linked_to: Some(member.id().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::number_format::Locale;
    use crate::domain::series::{RawSample, SamplePolicy, SeriesDefinition};
    use crate::domain::timestamp::TimestampKind;
    use crate::domain::unit::Unit;

    fn series(id: &str, unit: Unit, samples: Vec<RawSample>) -> Series {
        let definition = SeriesDefinition {
            id: id.to_string(),
            title: id.to_uppercase(),
            unit,
            timestamp_kind: TimestampKind::Year,
            locale: Locale::Norwegian,
        };
        Series::from_samples(definition, samples, SamplePolicy::Skip).unwrap()
    }

    #[test]
    fn test_axes_per_unit() {
        let celsius = Unit::new("°C", "Degrees Celsius");
        let a = series("a", celsius.clone(), vec![RawSample::new(1.0, "2000")]);
        let b = series("b", celsius, vec![RawSample::new(-2.5, "2001")]);
        let c = series("c", Unit::new("%", ""), vec![RawSample::new(40.0, "2000")]);
        let collection = SeriesCollection::new(vec![&a, &b, &c]);

        let config = ChartExporter::new(DecimalFormat::default()).export(&collection);
        assert_eq!(config.y_axes.len(), 2);
        assert_eq!(config.y_axes[0].title, "Degrees Celsius");
        assert_eq!(config.y_axes[0].min, Some(-2.5));
        assert_eq!(config.y_axes[0].max, Some(1.0));
        assert!(config.y_axes[0].allow_decimals);
        assert_eq!(config.y_axes[1].title, "%");
        assert!(!config.y_axes[1].allow_decimals);
        assert!(config.y_axes[1].opposite);
        assert_eq!(config.series[2].y_axis, 1);
    }

    #[test]
    fn test_aligned_data_with_nulls() {
        let unit = Unit::new("°C", "Degrees Celsius");
        let a = series("a", unit.clone(), vec![RawSample::new(1.23456, "2000")]);
        let b = series("b", unit, vec![RawSample::new(2.0, "2001")]);
        let collection = SeriesCollection::new(vec![&a, &b]);

        let config = ChartExporter::new(DecimalFormat::parse("#.##").unwrap()).export(&collection);
        assert_eq!(config.categories, vec!["2000", "2001"]);
        assert_eq!(config.series[0].data, vec![Some(ChartPoint::Value(1.23)), None]);
        assert_eq!(config.series[1].data, vec![None, Some(ChartPoint::Value(2.0))]);
    }

    #[test]
    fn test_error_bar_series_added() {
        let a = series(
            "a",
            Unit::new("°C", "Degrees Celsius"),
            vec![
                RawSample::new(2.0, "2000").with_low_high(1.0, 3.0),
                RawSample::new(2.5, "2001"),
            ],
        );
        let collection = SeriesCollection::new(vec![&a]);

        let config = ChartExporter::new(DecimalFormat::default()).export(&collection);
        assert_eq!(config.series.len(), 2);
        let bars = &config.series[1];
        assert_eq!(bars.kind, ChartSeriesKind::ErrorBar);
        assert_eq!(bars.linked_to.as_deref(), Some("a"));
        assert_eq!(bars.data, vec![Some(ChartPoint::Range(1.0, 3.0)), None]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut a = series("a", Unit::new("°C", ""), vec![RawSample::new(1.5, "2000")]);
        a.flag_as_trend_line();
        let collection = SeriesCollection::new(vec![&a]);

        let config = ChartExporter::new(DecimalFormat::default()).export(&collection);
        let json = serde_json::to_value(&config).unwrap();
        let first = &json["series"][0];
        assert_eq!(first["type"], "line");
        assert_eq!(first["dashStyle"], "ShortDash");
        assert_eq!(first["connectNulls"], true);
        assert_eq!(first["marker"]["enabled"], false);
        assert_eq!(first["data"][0], 1.5);
        assert_eq!(json["yAxes"][0]["symbol"], "°C");
    }
}

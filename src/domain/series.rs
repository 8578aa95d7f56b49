// Series domain model - ordered samples with unit, derived facts and chart styling
use super::data_point::{DataPoint, ValueSlot};
use super::error::SeriesError;
use super::number_format::Locale;
use super::timestamp::{Timestamp, TimestampKind};
use super::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default color applied by [`Series::flag_as_trend_line`].
pub const TREND_LINE_COLOR: &str = "#999999";

/// A numeric field as it arrives from a dataset document.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// A timestamp field: text, or a bare integer (a year, or epoch millis for
/// `TimestampKind::DateTime` series).
#[derive(Debug, Clone, PartialEq)]
pub enum RawWhen {
    Text(String),
    Integer(i64),
}

/// One unvalidated sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    pub value: Option<RawValue>,
    pub when: Option<RawWhen>,
    pub low: Option<RawValue>,
    pub high: Option<RawValue>,
    pub min: Option<RawValue>,
    pub max: Option<RawValue>,
}

impl RawSample {
    pub fn new(value: f64, when: &str) -> Self {
        Self {
            value: Some(RawValue::Number(value)),
            when: Some(RawWhen::Text(when.to_string())),
            ..Self::default()
        }
    }

    pub fn with_low_high(mut self, low: f64, high: f64) -> Self {
        self.low = Some(RawValue::Number(low));
        self.high = Some(RawValue::Number(high));
        self
    }

    pub fn with_min_max(mut self, min: f64, max: f64) -> Self {
        self.min = Some(RawValue::Number(min));
        self.max = Some(RawValue::Number(max));
        self
    }
}

/// What to do with a sample whose main value or timestamp is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplePolicy {
    /// Drop the sample and count it.
    #[default]
    Skip,
    /// Reject the whole series.
    FailFast,
}

/// Series metadata supplied once per series by the owning dataset.
#[derive(Debug, Clone, Default)]
pub struct SeriesDefinition {
    pub id: String,
    pub title: String,
    pub unit: Unit,
    pub timestamp_kind: TimestampKind,
    pub locale: Locale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashStyle {
    #[default]
    Solid,
    ShortDash,
    ShortDot,
    ShortDashDot,
    Dot,
    Dash,
    LongDash,
    DashDot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    color: Option<String>,
    line_thickness: f32,
    marker_visible: bool,
    marker_thickness: f32,
    dash_style: DashStyle,
    connect_nulls: bool,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            color: None,
            line_thickness: 2.0,
            marker_visible: true,
            marker_thickness: 4.0,
            dash_style: DashStyle::Solid,
            connect_nulls: false,
        }
    }
}

impl SeriesStyle {
    /// Normalized `#rrggbb`/`#rgb` color, if one was set.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn line_thickness(&self) -> f32 {
        self.line_thickness
    }

    pub fn marker_visible(&self) -> bool {
        self.marker_visible
    }

    pub fn marker_thickness(&self) -> f32 {
        self.marker_thickness
    }

    pub fn dash_style(&self) -> DashStyle {
        self.dash_style
    }

    pub fn connect_nulls(&self) -> bool {
        self.connect_nulls
    }
}

/// An ordered list of data points sharing a unit.
///
/// Derived facts (extremes, decimal flag, bound flags) are computed once while
/// the samples are ingested. The bound flags are monotonic: one sample with a
/// low/high pair marks the whole series, even if later samples omit it.
#[derive(Debug, Clone)]
pub struct Series {
    id: String,
    title: String,
    unit: Unit,
    locale: Locale,
    points: Vec<DataPoint>,
    min: Option<f64>,
    max: Option<f64>,
    is_decimal: bool,
    has_low_high: bool,
    has_min_max: bool,
    skipped_samples: usize,
    time_markers: HashSet<String>,
    style: SeriesStyle,
    trend_line: bool,
}

impl Series {
    pub fn new(definition: SeriesDefinition) -> Self {
        Self {
            id: definition.id,
            title: definition.title,
            unit: definition.unit,
            locale: definition.locale,
            points: Vec::new(),
            min: None,
            max: None,
            is_decimal: false,
            has_low_high: false,
            has_min_max: false,
            skipped_samples: 0,
            time_markers: HashSet::new(),
            style: SeriesStyle::default(),
            trend_line: false,
        }
    }

    /// Build a series from raw samples, keeping their supplied order.
    ///
    /// Unusable samples are dropped under [`SamplePolicy::Skip`] and reported
    /// as an error under [`SamplePolicy::FailFast`].
    pub fn from_samples<I>(
        definition: SeriesDefinition,
        samples: I,
        policy: SamplePolicy,
    ) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = RawSample>,
    {
        let kind = definition.timestamp_kind;
        let mut series = Self::new(definition);

        for (index, sample) in samples.into_iter().enumerate() {
            match series.build_point(&sample, kind) {
                Ok(point) => series.push(point),
                Err(reason) => {
                    if policy == SamplePolicy::FailFast {
                        return Err(SeriesError::UnparsableSample {
                            series_id: series.id.clone(),
                            index,
                            reason,
                        });
                    }
                    series.skipped_samples += 1;
                }
            }
        }

        if series.skipped_samples > 0 {
            tracing::warn!(
                "Series {}: dropped {} unparsable samples",
                series.id,
                series.skipped_samples
            );
        }
        tracing::debug!(
            "Series {}: {} points, {} time markers",
            series.id,
            series.points.len(),
            series.time_markers.len()
        );

        Ok(series)
    }

    fn build_point(&self, sample: &RawSample, kind: TimestampKind) -> Result<DataPoint, String> {
        let value = match &sample.value {
            Some(raw) => raw.parse().ok_or_else(|| format!("unparsable value {:?}", raw))?,
            None => return Err("missing value".to_string()),
        };

        let timestamp = match &sample.when {
            Some(RawWhen::Text(text)) => Timestamp::with_kind(text, kind),
            Some(RawWhen::Integer(n)) if kind == TimestampKind::DateTime => {
                Timestamp::from_epoch_millis(*n)
            }
            Some(RawWhen::Integer(n)) => match i32::try_from(*n) {
                Ok(year) if kind != TimestampKind::Literal => Timestamp::from_year(year),
                _ => Timestamp::literal(&n.to_string()),
            },
            None => return Err("missing timestamp".to_string()),
        };

        let mut point = DataPoint::at(value, timestamp, self.locale);
        if let Some((low, high)) = parse_pair(&sample.low, &sample.high) {
            point.set_low_high(low, high);
        }
        if let Some((min, max)) = parse_pair(&sample.min, &sample.max) {
            point.set_min_max(min, max);
        }
        Ok(point)
    }

    /// Append a point and fold it into the derived facts.
    pub fn push(&mut self, point: DataPoint) {
        let mut touched = vec![point.value()];
        if point.has_low_high() {
            self.has_low_high = true;
            touched.extend([point.get(ValueSlot::Low), point.get(ValueSlot::High)]);
        }
        if point.has_min_max() {
            self.has_min_max = true;
            touched.extend([point.get(ValueSlot::Min), point.get(ValueSlot::Max)]);
        }

        for value in touched {
            self.min = Some(self.min.map_or(value, |m| m.min(value)));
            self.max = Some(self.max.map_or(value, |m| m.max(value)));
            if value.fract() != 0.0 {
                self.is_decimal = true;
            }
        }

        self.time_markers.insert(point.time_marker().to_string());
        self.points.push(point);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest value seen, bounds included.
    pub fn min_value(&self) -> Option<f64> {
        self.min
    }

    /// Largest value seen, bounds included.
    pub fn max_value(&self) -> Option<f64> {
        self.max
    }

    pub fn is_integral(&self) -> bool {
        !self.is_decimal
    }

    pub fn has_low_high(&self) -> bool {
        self.has_low_high
    }

    pub fn has_min_max(&self) -> bool {
        self.has_min_max
    }

    /// Low/high bands without min/max: rendered as an extra error-bar series.
    pub fn is_error_bar_series(&self) -> bool {
        self.has_low_high && !self.has_min_max
    }

    pub fn skipped_samples(&self) -> usize {
        self.skipped_samples
    }

    /// Number of distinct time markers in this series.
    pub fn time_marker_count(&self) -> usize {
        self.time_markers.len()
    }

    /// First point whose time marker equals `key`.
    pub fn data_point_for_time_marker(&self, key: &str) -> Option<&DataPoint> {
        self.points.iter().find(|p| p.time_marker() == key)
    }

    pub fn style(&self) -> &SeriesStyle {
        &self.style
    }

    pub fn is_trend_line(&self) -> bool {
        self.trend_line
    }

    /// Set the chart color from 3 or 6 hex digits, with or without `#`.
    /// Invalid input is logged and leaves the current color in place.
    pub fn set_color(&mut self, color: &str) {
        match normalize_color(color) {
            Some(normalized) => self.style.color = Some(normalized),
            None => tracing::error!("Series {}: rejected invalid color '{}'", self.id, color),
        }
    }

    pub fn set_line_thickness(&mut self, thickness: f32) {
        self.style.line_thickness = thickness;
    }

    pub fn set_marker_visible(&mut self, visible: bool) {
        self.style.marker_visible = visible;
    }

    pub fn set_marker_thickness(&mut self, thickness: f32) {
        self.style.marker_thickness = thickness;
    }

    pub fn set_dash_style(&mut self, dash_style: DashStyle) {
        self.style.dash_style = dash_style;
    }

    pub fn set_connect_nulls(&mut self, connect_nulls: bool) {
        self.style.connect_nulls = connect_nulls;
    }

    /// Trend line look: grey, no markers, nulls connected, short dashes.
    pub fn flag_as_trend_line(&mut self) {
        self.flag_as_trend_line_with(TREND_LINE_COLOR);
    }

    /// Trend line look in `color`. An invalid color falls back to [`TREND_LINE_COLOR`].
    pub fn flag_as_trend_line_with(&mut self, color: &str) {
        let color = normalize_color(color).unwrap_or_else(|| {
            tracing::error!("Series {}: rejected invalid trend line color '{}'", self.id, color);
            TREND_LINE_COLOR.to_string()
        });
        self.trend_line = true;
        self.style.color = Some(color);
        self.style.marker_visible = false;
        self.style.connect_nulls = true;
        self.style.dash_style = DashStyle::ShortDash;
    }
}

fn parse_pair(first: &Option<RawValue>, second: &Option<RawValue>) -> Option<(f64, f64)> {
    let first = first.as_ref()?.parse()?;
    let second = second.as_ref()?.parse()?;
    Some((first, second))
}

fn normalize_color(color: &str) -> Option<String> {
    let hex = color.trim().strip_prefix('#').unwrap_or(color.trim());
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    valid.then(|| format!("#{}", hex.to_ascii_lowercase()))
}

// Series collection - aligns member series onto one shared timeline
use super::data_point::DataPoint;
use super::series::Series;
use super::timestamp::Timestamp;
use super::unit::Unit;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One aligned row: a slot per member series, `None` where that series has no sample.
pub type AlignedRow<'a> = Vec<Option<&'a DataPoint>>;

/// Member series aligned by time marker.
///
/// Rows are keyed by each point's native-format time marker and kept in the
/// keys' string order. The slot index of a series is its position in the
/// member list; [`SeriesCollection::sort_by`] reassigns those positions, so
/// column indices must not be cached across a sort.
#[derive(Debug, Clone)]
pub struct SeriesCollection<'a> {
    series: Vec<&'a Series>,
    rows: BTreeMap<String, AlignedRow<'a>>,
    units: Vec<Unit>,
    time_marker_count: usize,
    has_error_bar_series: bool,
}

impl<'a> SeriesCollection<'a> {
    pub fn new(series: Vec<&'a Series>) -> Self {
        let mut collection = Self {
            series,
            rows: BTreeMap::new(),
            units: Vec::new(),
            time_marker_count: 0,
            has_error_bar_series: false,
        };
        collection.align();
        collection
    }

    fn align(&mut self) {
        self.rows.clear();
        self.units.clear();
        self.time_marker_count = 0;
        self.has_error_bar_series = false;

        let width = self.series.len();
        for (column, &series) in self.series.iter().enumerate() {
            if !self.units.contains(series.unit()) {
                self.units.push(series.unit().clone());
            }

            for point in series.points() {
                let row = self
                    .rows
                    .entry(point.time_marker().to_string())
                    .or_insert_with(|| vec![None; width]);
                row[column] = Some(point);
            }

            // Largest per-series count, not the size of the union.
            self.time_marker_count = self.time_marker_count.max(series.time_marker_count());

            if series.is_error_bar_series() {
                self.has_error_bar_series = true;
            }
        }

        tracing::debug!(
            "Aligned {} series onto {} time markers ({} units)",
            width,
            self.rows.len(),
            self.units.len()
        );
    }

    /// Reorder the members and align again. Supplied rows are discarded.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Series, &Series) -> Ordering,
    {
        let mut sorted = self.series.clone();
        sorted.sort_by(|a, b| compare(a, b));
        self.series = sorted;
        self.align();
    }

    pub fn series(&self) -> &[&'a Series] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Column of the member with `id`, valid until the next sort.
    pub fn column_of(&self, id: &str) -> Option<usize> {
        self.series.iter().position(|s| s.id() == id)
    }

    /// Time markers in ascending key order. Each call starts a fresh iteration.
    pub fn time_markers(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.keys().map(String::as_str)
    }

    /// Time markers ordered by instant instead of key text. Literal markers
    /// follow the dated ones in text order.
    ///
    /// Differs from [`Self::time_markers`] when members mix precisions or
    /// carry years outside four digits.
    pub fn chronological_time_markers(&self) -> Vec<&str> {
        let mut keyed: Vec<(Timestamp, &str)> = self
            .rows
            .iter()
            .map(|(key, row)| {
                let timestamp = row
                    .iter()
                    .flatten()
                    .next()
                    .map(|point| point.timestamp().clone())
                    .unwrap_or_else(|| Timestamp::parse(key));
                (timestamp, key.as_str())
            })
            .collect();
        keyed.sort_by(|(a, a_key), (b, b_key)| {
            match (a.instant(), b.instant()) {
                (Some(x), Some(y)) => x.cmp(&y).then(a.kind().cmp(&b.kind())),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a_key.cmp(b_key))
        });
        keyed.into_iter().map(|(_, key)| key).collect()
    }

    /// The aligned row for `key`, one slot per member.
    pub fn data_points_for_time_marker(&self, key: &str) -> Option<&[Option<&'a DataPoint>]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// Distinct units in first-seen member order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Members measured in `unit`, in member order.
    pub fn series_with_unit(&self, unit: &Unit) -> Vec<&'a Series> {
        self.series
            .iter()
            .copied()
            .filter(|s| s.unit() == unit)
            .collect()
    }

    /// The largest number of distinct time markers found in a single member.
    pub fn time_marker_count(&self) -> usize {
        self.time_marker_count
    }

    /// Number of rows on the shared timeline.
    pub fn union_marker_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_error_bar_series(&self) -> bool {
        self.has_error_bar_series
    }

    /// Merge pre-built rows, e.g. empty markers that keep an irregular axis
    /// evenly spaced. Existing keys are overwritten; rows are padded or cut
    /// to the member count.
    pub fn merge_supplied_rows(&mut self, rows: BTreeMap<String, AlignedRow<'a>>) {
        let width = self.series.len();
        for (key, mut row) in rows {
            if row.len() != width {
                tracing::warn!(
                    "Supplied row '{}' has {} slots for {} series",
                    key,
                    row.len(),
                    width
                );
                row.resize(width, None);
            }
            self.rows.insert(key, row);
        }
    }
}

// Data point domain model - one sample tied to a timestamp
use super::number_format::{DecimalFormat, Locale};
use super::timestamp::{Timestamp, TimestampKind};

/// Addressable values of a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSlot {
    Main,
    Low,
    High,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    value: f64,
    low_high: Option<(f64, f64)>,
    min_max: Option<(f64, f64)>,
    timestamp: Timestamp,
    time_marker: String,
    locale: Locale,
}

impl DataPoint {
    pub fn new(value: f64, raw_timestamp: &str, kind: TimestampKind, locale: Locale) -> Self {
        Self::at(value, Timestamp::with_kind(raw_timestamp, kind), locale)
    }

    pub fn at(value: f64, timestamp: Timestamp, locale: Locale) -> Self {
        let time_marker = timestamp.native_format();
        Self {
            value,
            low_high: None,
            min_max: None,
            timestamp,
            time_marker,
            locale,
        }
    }

    pub fn set_low_high(&mut self, low: f64, high: f64) {
        self.low_high = Some((low, high));
    }

    pub fn set_min_max(&mut self, min: f64, max: f64) {
        self.min_max = Some((min, max));
    }

    pub fn has_low_high(&self) -> bool {
        self.low_high.is_some()
    }

    pub fn has_min_max(&self) -> bool {
        self.min_max.is_some()
    }

    /// 1 for a plain value, 3 with low/high, 5 once min/max is set as well.
    pub fn value_count(&self) -> usize {
        if self.has_min_max() {
            5
        } else if self.has_low_high() {
            3
        } else {
            1
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Raw value in `slot`. An unset bound reads as `0.0`; check
    /// `has_low_high`/`has_min_max` first.
    pub fn get(&self, slot: ValueSlot) -> f64 {
        match slot {
            ValueSlot::Main => Some(self.value),
            ValueSlot::Low => self.low_high.map(|(low, _)| low),
            ValueSlot::High => self.low_high.map(|(_, high)| high),
            ValueSlot::Min => self.min_max.map(|(min, _)| min),
            ValueSlot::Max => self.min_max.map(|(_, max)| max),
        }
        .unwrap_or(0.0)
    }

    /// Value in `slot` formatted for this point's display locale.
    pub fn get_formatted(&self, slot: ValueSlot, format: &DecimalFormat) -> String {
        self.get_formatted_in(slot, format, self.locale)
    }

    /// Value in `slot` formatted for an explicit locale, e.g. English for chart
    /// snippets regardless of the page language.
    pub fn get_formatted_in(&self, slot: ValueSlot, format: &DecimalFormat, locale: Locale) -> String {
        format.format(self.get(slot), locale)
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Key used to align this point with other series.
    pub fn time_marker(&self) -> &str {
        &self.time_marker
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_count() {
        let mut point = DataPoint::new(2.0, "2001", TimestampKind::Year, Locale::English);
        assert_eq!(point.value_count(), 1);
        point.set_low_high(1.5, 2.5);
        assert_eq!(point.value_count(), 3);
        point.set_min_max(1.0, 3.0);
        assert_eq!(point.value_count(), 5);
    }

    #[test]
    fn test_get_slots() {
        let mut point = DataPoint::new(2.0, "2001", TimestampKind::Year, Locale::English);
        assert_eq!(point.get(ValueSlot::Low), 0.0);
        point.set_low_high(1.5, 2.5);
        assert_eq!(point.get(ValueSlot::Main), 2.0);
        assert_eq!(point.get(ValueSlot::Low), 1.5);
        assert_eq!(point.get(ValueSlot::High), 2.5);
        assert_eq!(point.get(ValueSlot::Max), 0.0);
    }

    #[test]
    fn test_formatting_locale() {
        let point = DataPoint::new(-1.25, "2001-03", TimestampKind::Month, Locale::Norwegian);
        let format = DecimalFormat::parse("#.####").unwrap();
        assert_eq!(point.get_formatted(ValueSlot::Main, &format), "-1,25");
        assert_eq!(
            point.get_formatted_in(ValueSlot::Main, &format, Locale::English),
            "-1.25"
        );
    }

    #[test]
    fn test_time_marker_uses_native_format() {
        let point = DataPoint::new(1.0, "2001-03", TimestampKind::Unknown, Locale::English);
        assert_eq!(point.time_marker(), "2001-03");
        let literal = DataPoint::new(1.0, "2007/2008", TimestampKind::Unknown, Locale::English);
        assert_eq!(literal.time_marker(), "2007/2008");
    }
}

// Locale-aware decimal formatting for exported values
use super::error::SeriesError;
use num_format::ToFormattedString;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Display locale of a page or data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Locale {
    #[default]
    English,
    Norwegian,
}

impl Locale {
    /// CLDR number data backing this locale.
    pub fn number_locale(&self) -> &'static num_format::Locale {
        match self {
            Locale::English => &num_format::Locale::en,
            Locale::Norwegian => &num_format::Locale::nb,
        }
    }

    pub fn decimal_separator(&self) -> &'static str {
        self.number_locale().decimal()
    }

    pub fn grouping_separator(&self) -> &'static str {
        self.number_locale().separator()
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Norwegian => "no",
        }
    }
}

impl FromStr for Locale {
    type Err = SeriesError;

    /// Accepts bare language tags and region variants ("en", "en_GB", "nb-NO").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "en" => Ok(Locale::English),
            "no" | "nb" | "nn" => Ok(Locale::Norwegian),
            _ => Err(SeriesError::UnknownLocale(s.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = SeriesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A compiled decimal pattern such as `#.####`, `0.00` or `#,##0.0`.
///
/// `0` is a required digit, `#` an optional one and `.` separates the fraction
/// part. Any `,` in the integer part turns on the locale's own digit grouping.
/// Rounding is half-to-even.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalFormat {
    pattern: String,
    min_integer_digits: usize,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
    grouped: bool,
}

impl DecimalFormat {
    pub fn parse(pattern: &str) -> Result<Self, SeriesError> {
        let invalid = |reason: &str| SeriesError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("empty pattern"));
        }
        if let Some(c) = pattern.chars().find(|c| !matches!(c, '#' | '0' | '.' | ',')) {
            return Err(invalid(&format!("unsupported character '{}'", c)));
        }

        let mut parts = pattern.split('.');
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(invalid("more than one decimal separator"));
        }
        if fraction.contains(',') {
            return Err(invalid("grouping separator in fraction part"));
        }
        if fraction.trim_start_matches('0').contains('0') {
            return Err(invalid("required fraction digit after optional digit"));
        }
        let integer_digits: String = integer.chars().filter(|c| *c != ',').collect();
        if integer_digits.trim_start_matches('#').contains('#') {
            return Err(invalid("optional integer digit after required digit"));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            min_integer_digits: integer_digits.chars().filter(|c| *c == '0').count(),
            min_fraction_digits: fraction.chars().filter(|c| *c == '0').count(),
            max_fraction_digits: fraction.len(),
            grouped: integer.contains(','),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn max_fraction_digits(&self) -> usize {
        self.max_fraction_digits
    }

    /// Format `value` with the separators of `locale`. Non-finite values render empty.
    pub fn format(&self, value: f64, locale: Locale) -> String {
        if !value.is_finite() {
            return String::new();
        }

        let fixed = format!("{:.*}", self.max_fraction_digits, value.abs());
        let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut fraction = fraction.to_string();
        while fraction.len() > self.min_fraction_digits && fraction.ends_with('0') {
            fraction.pop();
        }

        let mut integer = integer.trim_start_matches('0').to_string();
        while integer.len() < self.min_integer_digits {
            integer.insert(0, '0');
        }
        if integer.is_empty() && fraction.is_empty() {
            integer.push('0');
        }

        let is_zero = !integer.chars().chain(fraction.chars()).any(|c| c != '0');
        let mut out = String::with_capacity(integer.len() + fraction.len() + 4);
        if value.is_sign_negative() && !is_zero {
            out.push('-');
        }
        out.push_str(&self.render_integer(&integer, locale));
        if !fraction.is_empty() {
            out.push_str(locale.decimal_separator());
            out.push_str(&fraction);
        }
        out
    }

    /// Round `value` to the pattern's maximum fraction digits.
    pub fn round(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        format!("{:.*}", self.max_fraction_digits, value)
            .parse()
            .unwrap_or(value)
    }

    /// Zero padding from the pattern stays ungrouped in front of the number.
    fn render_integer(&self, digits: &str, locale: Locale) -> String {
        let significant = digits.trim_start_matches('0');
        if !self.grouped || significant.is_empty() {
            return digits.to_string();
        }
        let padding = &digits[..digits.len() - significant.len()];
        match significant.parse::<u128>() {
            Ok(n) => format!("{}{}", padding, n.to_formatted_string(locale.number_locale())),
            Err(_) => {
                tracing::debug!("{} integer digits exceed grouping range", significant.len());
                digits.to_string()
            }
        }
    }
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self {
            pattern: "#.####".to_string(),
            min_integer_digits: 0,
            min_fraction_digits: 0,
            max_fraction_digits: 4,
            grouped: false,
        }
    }
}

impl FromStr for DecimalFormat {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Measurement unit domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// A measurement unit with its short and verbose forms, e.g. `°C` / `Degrees Celsius`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Unit {
    pub symbol: String,
    #[serde(default)]
    pub label: String,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
        }
    }

    /// Text for axis titles: the label when known, the symbol otherwise.
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.symbol
        } else {
            &self.label
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        assert_eq!(Unit::new("°C", "Degrees Celsius"), Unit::new("°C", "Degrees Celsius"));
        assert_ne!(Unit::new("°C", "Degrees Celsius"), Unit::new("°C", "Celsius"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Unit::new("km²", "").display_name(), "km²");
        assert_eq!(Unit::new("km²", "Square kilometres").display_name(), "Square kilometres");
    }
}

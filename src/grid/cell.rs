use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single cell value as a closed tagged variant.
///
/// Every stage compares and stringifies cells through this type so the
/// rules live in exactly one place (deduplication and sentinel checks
/// depend on them agreeing).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Empty, or text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringify without trimming. `Empty` becomes `""`, integral numbers
    /// drop the trailing `.0` so `40123456.0` compares equal to its text
    /// form after a spreadsheet round-trip.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Trimmed stringification used for all comparisons.
    pub fn normalized(&self) -> String {
        self.as_text().trim().to_string()
    }

    /// Strip trailing whitespace from text values; other variants are
    /// returned unchanged. Used before whole-table deduplication.
    pub fn trim_trailing(&self) -> CellValue {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim_end();
                if trimmed.len() == s.len() {
                    self.clone()
                } else {
                    Self::Text(trimmed.to_string())
                }
            }
            other => other.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::text("   ").is_empty());
        assert!(!CellValue::text("x").is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn integral_numbers_stringify_without_decimals() {
        assert_eq!(CellValue::Number(40123456.0).as_text(), "40123456");
        assert_eq!(CellValue::Number(1.5).as_text(), "1.5");
    }

    #[test]
    fn normalized_trims_both_ends() {
        assert_eq!(CellValue::text("  Chemical  ").normalized(), "Chemical");
        assert_eq!(CellValue::Empty.normalized(), "");
    }

    #[test]
    fn trim_trailing_only_touches_text() {
        assert_eq!(
            CellValue::text("Cotton  ").trim_trailing(),
            CellValue::text("Cotton")
        );
        assert_eq!(
            CellValue::text("  Cotton").trim_trailing(),
            CellValue::text("  Cotton")
        );
        assert_eq!(CellValue::Number(2.0).trim_trailing(), CellValue::Number(2.0));
    }
}

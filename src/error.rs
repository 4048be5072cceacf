//! Structured error types for the formslate renderer.
//!
//! Render-level failures surface as [`FormslateError`]. Geometry problems found
//! while laying out the page are [`LayoutError`]s and indicate a caller or
//! configuration defect; they are never retried.

use thiserror::Error;

/// The unified error type returned by all public formslate API functions.
#[derive(Debug, Error)]
pub enum FormslateError {
    /// A render was requested before the drawing backend finished loading.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Column or row geometry is invalid.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// A drawing-backend primitive call failed.
    #[error("Render error: {0}")]
    Render(String),

    /// JSON input failed to parse as field values or configuration.
    #[error("Failed to parse input: {source}{}", format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// Persisting the finished document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FormslateError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FormslateError::Parse { source: e, hint }
    }
}

/// Invalid geometry detected while computing the page layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Fixed-width columns leave a negative remainder.
    #[error("fixed columns need {fixed:.2} units but only {available:.2} are available")]
    ColumnOverflow { fixed: f64, available: f64 },

    /// Proportional column fractions do not add up to 1.0.
    #[error("column fractions sum to {sum:.4}, expected 1.0")]
    FractionSum { sum: f64 },

    /// A column width or fraction is negative or not finite.
    #[error("column {index} has invalid width {value}")]
    InvalidWidth { index: usize, value: f64 },

    /// A fixed-width row must contain exactly one remainder column.
    #[error("fixed-width row needs exactly one remainder column, found {found}")]
    RemainderCount { found: usize },

    /// Fractions were mixed with fixed/remainder columns in one row.
    #[error("a row cannot mix fractional and fixed columns")]
    MixedColumns,

    /// A row was declared without any columns.
    #[error("row has no columns")]
    NoColumns,

    /// The number of cells does not match the number of columns.
    #[error("row declares {columns} columns but has {cells} cells")]
    ColumnCountMismatch { columns: usize, cells: usize },

    /// The cursor was asked to move backwards.
    #[error("cursor cannot advance by {0}")]
    NegativeAdvance(f64),

    /// The page is too narrow for its margins.
    #[error("content width {0:.2} is not positive")]
    NonPositiveContentWidth(f64),

    /// A layout step ran before the step it depends on.
    #[error("layout step out of order: expected {expected}, engine is {found}")]
    OutOfOrder {
        expected: &'static str,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_hint() {
        let err: FormslateError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse input"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn test_layout_error_converts() {
        let err: FormslateError = LayoutError::ColumnOverflow {
            fixed: 250.0,
            available: 190.0,
        }
        .into();
        assert!(matches!(err, FormslateError::Layout(_)));
        assert!(err.to_string().contains("250.00"));
    }
}

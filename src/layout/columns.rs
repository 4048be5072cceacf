//! # Column Layout
//!
//! Splits a row's content width between its cells. Two modes are supported:
//! - every column a [`ColumnWidth::Fraction`], the fractions summing to 1.0;
//! - fixed columns plus exactly one [`ColumnWidth::Remainder`] that absorbs
//!   whatever width is left.
//!
//! A layout that would produce a negative column is an error, never a clamp.

use crate::error::LayoutError;
use crate::model::ColumnWidth;

/// Fractions may drift this far from 1.0 before the row is rejected.
const FRACTION_TOLERANCE: f64 = 1e-6;

/// Resolve column definitions to concrete widths that sum to `available_width`.
pub fn resolve_columns(
    defs: &[ColumnWidth],
    available_width: f64,
) -> Result<Vec<f64>, LayoutError> {
    if available_width.is_nan() || available_width <= 0.0 {
        return Err(LayoutError::NonPositiveContentWidth(available_width));
    }
    if defs.is_empty() {
        return Err(LayoutError::NoColumns);
    }

    for (index, def) in defs.iter().enumerate() {
        match *def {
            ColumnWidth::Fraction(value) | ColumnWidth::Fixed(value)
                if !value.is_finite() || value < 0.0 =>
            {
                return Err(LayoutError::InvalidWidth { index, value });
            }
            _ => {}
        }
    }

    let fractional = defs
        .iter()
        .filter(|d| matches!(d, ColumnWidth::Fraction(_)))
        .count();

    if fractional == defs.len() {
        proportional(defs, available_width)
    } else if fractional == 0 {
        fixed_with_remainder(defs, available_width)
    } else {
        Err(LayoutError::MixedColumns)
    }
}

fn proportional(defs: &[ColumnWidth], available_width: f64) -> Result<Vec<f64>, LayoutError> {
    let sum: f64 = defs
        .iter()
        .map(|d| match d {
            ColumnWidth::Fraction(f) => *f,
            _ => 0.0,
        })
        .sum();
    if (sum - 1.0).abs() > FRACTION_TOLERANCE {
        return Err(LayoutError::FractionSum { sum });
    }

    let mut widths: Vec<f64> = defs
        .iter()
        .map(|d| match d {
            ColumnWidth::Fraction(f) => available_width * f,
            _ => 0.0,
        })
        .collect();

    // Let the last column take the rounding residue so the row closes exactly.
    let assigned: f64 = widths[..widths.len() - 1].iter().sum();
    if let Some(last) = widths.last_mut() {
        *last = available_width - assigned;
    }
    Ok(widths)
}

fn fixed_with_remainder(
    defs: &[ColumnWidth],
    available_width: f64,
) -> Result<Vec<f64>, LayoutError> {
    let remainders = defs
        .iter()
        .filter(|d| matches!(d, ColumnWidth::Remainder))
        .count();
    if remainders != 1 {
        return Err(LayoutError::RemainderCount { found: remainders });
    }

    let fixed: f64 = defs
        .iter()
        .map(|d| match d {
            ColumnWidth::Fixed(w) => *w,
            _ => 0.0,
        })
        .sum();
    let remaining = available_width - fixed;
    if remaining < 0.0 {
        return Err(LayoutError::ColumnOverflow {
            fixed,
            available: available_width,
        });
    }

    Ok(defs
        .iter()
        .map(|d| match d {
            ColumnWidth::Fixed(w) => *w,
            _ => remaining,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_proportional_a4_row() {
        let defs = [
            ColumnWidth::Fraction(0.4),
            ColumnWidth::Fraction(0.4),
            ColumnWidth::Fraction(0.2),
        ];
        let widths = resolve_columns(&defs, 190.0).unwrap();
        assert!(close(widths[0], 76.0));
        assert!(close(widths[1], 76.0));
        assert!(close(widths[2], 38.0));
    }

    #[test]
    fn test_proportional_sum_matches_width() {
        let defs = [
            ColumnWidth::Fraction(0.4),
            ColumnWidth::Fraction(0.4),
            ColumnWidth::Fraction(0.2),
        ];
        for w in [0.5, 1.0, 17.3, 190.0, 575.28, 1e6] {
            let widths = resolve_columns(&defs, w).unwrap();
            let sum: f64 = widths.iter().sum();
            assert!((sum - w).abs() < 1e-9 * w.max(1.0), "sum {} != {}", sum, w);
        }
    }

    #[test]
    fn test_remainder_absorbs_leftover() {
        let defs = [ColumnWidth::Fixed(100.0), ColumnWidth::Remainder];
        assert_eq!(resolve_columns(&defs, 190.0).unwrap(), vec![100.0, 90.0]);
    }

    #[test]
    fn test_remainder_may_sit_in_the_middle() {
        let defs = [
            ColumnWidth::Fixed(30.0),
            ColumnWidth::Remainder,
            ColumnWidth::Fixed(40.0),
        ];
        assert_eq!(
            resolve_columns(&defs, 190.0).unwrap(),
            vec![30.0, 120.0, 40.0]
        );
    }

    #[test]
    fn test_fixed_overflow_is_an_error() {
        let defs = [
            ColumnWidth::Fixed(150.0),
            ColumnWidth::Fixed(100.0),
            ColumnWidth::Remainder,
        ];
        assert_eq!(
            resolve_columns(&defs, 190.0),
            Err(LayoutError::ColumnOverflow {
                fixed: 250.0,
                available: 190.0
            })
        );
    }

    #[test]
    fn test_fraction_sum_must_be_one() {
        let defs = [ColumnWidth::Fraction(0.5), ColumnWidth::Fraction(0.4)];
        assert!(matches!(
            resolve_columns(&defs, 190.0),
            Err(LayoutError::FractionSum { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_rows() {
        assert_eq!(resolve_columns(&[], 190.0), Err(LayoutError::NoColumns));
        assert_eq!(
            resolve_columns(&[ColumnWidth::Fixed(10.0)], 190.0),
            Err(LayoutError::RemainderCount { found: 0 })
        );
        assert_eq!(
            resolve_columns(&[ColumnWidth::Remainder, ColumnWidth::Remainder], 190.0),
            Err(LayoutError::RemainderCount { found: 2 })
        );
        assert_eq!(
            resolve_columns(&[ColumnWidth::Fraction(1.0), ColumnWidth::Remainder], 190.0),
            Err(LayoutError::MixedColumns)
        );
        assert_eq!(
            resolve_columns(&[ColumnWidth::Fixed(-5.0), ColumnWidth::Remainder], 190.0),
            Err(LayoutError::InvalidWidth {
                index: 0,
                value: -5.0
            })
        );
        assert_eq!(
            resolve_columns(&[ColumnWidth::Remainder], 0.0),
            Err(LayoutError::NonPositiveContentWidth(0.0))
        );
    }
}

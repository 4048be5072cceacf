//! The running vertical position on the page.

use crate::error::LayoutError;

/// Tracks where the next element goes. Only ever moves down the page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCursor {
    y: f64,
}

impl LayoutCursor {
    pub fn new(start: f64) -> Self {
        Self { y: start }
    }

    pub fn position(&self) -> f64 {
        self.y
    }

    /// Move the cursor down by `distance`. Negative or non-finite distances
    /// are rejected and leave the cursor where it was.
    pub fn advance(&mut self, distance: f64) -> Result<(), LayoutError> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(LayoutError::NegativeAdvance(distance));
        }
        self.y += distance;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut cursor = LayoutCursor::new(15.0);
        cursor.advance(5.0).unwrap();
        cursor.advance(0.0).unwrap();
        cursor.advance(10.0).unwrap();
        assert_eq!(cursor.position(), 30.0);
    }

    #[test]
    fn test_negative_advance_is_rejected() {
        let mut cursor = LayoutCursor::new(20.0);
        assert_eq!(
            cursor.advance(-1.0),
            Err(LayoutError::NegativeAdvance(-1.0))
        );
        assert!(cursor.advance(f64::NAN).is_err());
        assert_eq!(cursor.position(), 20.0);
    }
}

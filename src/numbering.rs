//! Fixed-width parent and child identifiers.
//!
//! Identifiers are zero-padded decimal strings. The next identifier is formed
//! by overwriting the trailing digits of the previous one with the new 1-based
//! index; an index with more digits than the width is rejected rather than
//! truncated.

use crate::error::{Result, StandoffError};

/// Default identifier width.
pub const DEFAULT_ID_WIDTH: usize = 6;

/// The all-zero identifier of the given width.
pub fn initial_identifier(width: usize) -> String {
    "0".repeat(width)
}

/// Overwrite the trailing digits of `previous` with `index`.
///
/// # Examples
///
/// ```
/// use standoff::numbering::next_identifier;
///
/// assert_eq!(next_identifier("000000", 5).unwrap(), "000005");
/// assert_eq!(next_identifier("000005", 12).unwrap(), "000012");
/// ```
pub fn next_identifier(previous: &str, index: usize) -> Result<String> {
    let digits = index.to_string();
    let width = previous.len();
    if digits.len() > width || !previous.is_ascii() {
        return Err(StandoffError::IdentifierOverflow { index, width });
    }
    Ok(format!("{}{}", &previous[..width - digits.len()], digits))
}

/// Generates successive identifiers of one width.
#[derive(Clone, Debug)]
pub struct IdentifierSequence {
    current: String,
    index: usize,
}

impl IdentifierSequence {
    pub fn new(width: usize) -> Self {
        IdentifierSequence {
            current: initial_identifier(width),
            index: 0,
        }
    }

    /// Advance to the next index and return its identifier.
    pub fn advance(&mut self) -> Result<&str> {
        let index = self.index + 1;
        self.current = next_identifier(&self.current, index)?;
        self.index = index;
        Ok(&self.current)
    }

    /// The last index handed out (0 before the first `advance`).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_identifier() {
        assert_eq!(next_identifier("000000", 5).unwrap(), "000005");
        assert_eq!(next_identifier("000005", 12).unwrap(), "000012");
        assert_eq!(next_identifier("000099", 100).unwrap(), "000100");
        assert_eq!(next_identifier("000000", 999_999).unwrap(), "999999");
    }

    #[test]
    fn test_overflow_is_an_error() {
        match next_identifier("999999", 1_000_000) {
            Err(StandoffError::IdentifierOverflow { index, width }) => {
                assert_eq!(index, 1_000_000);
                assert_eq!(width, 6);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
        assert!(next_identifier("0", 10).is_err());
    }

    #[test]
    fn test_sequence() {
        let mut seq = IdentifierSequence::new(3);
        assert_eq!(seq.current(), "000");
        assert_eq!(seq.advance().unwrap(), "001");
        for _ in 0..9 {
            seq.advance().unwrap();
        }
        assert_eq!(seq.current(), "010");
        assert_eq!(seq.index(), 10);
    }

    #[test]
    fn test_sequence_overflow_keeps_last_identifier() {
        let mut seq = IdentifierSequence::new(1);
        for _ in 0..9 {
            seq.advance().unwrap();
        }
        assert_eq!(seq.current(), "9");
        assert!(seq.advance().is_err());
        assert_eq!(seq.current(), "9");
        assert_eq!(seq.index(), 9);
    }
}

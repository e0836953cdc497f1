use thiserror::Error;

/// An enumeration of potential errors that appear during bencode decoding.
///
/// Every variant carries the byte offset into the input at which the problem was detected.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Reached the end of the input in the middle of a value.
    #[error("reached EOF in the middle of a value at offset {offset}")]
    UnexpectedEof {
        /// Length of the input, where the missing bytes should have been.
        offset: usize,
    },

    /// Saw a byte that can't appear at this position.
    #[error("expected {expected}, got '{}' at offset {offset}", .found.escape_ascii())]
    UnexpectedByte {
        /// Human readable description of what was acceptable here.
        expected: &'static str,
        /// The byte that was actually found.
        found: u8,
        /// Position of `found` in the input.
        offset: usize,
    },

    /// An integer or a byte string length without a single digit.
    #[error("missing digits at offset {offset}")]
    MissingDigits {
        /// Position right after the (absent) digits.
        offset: usize,
    },

    /// A byte string length that doesn't fit into the address space.
    #[error("byte string length at offset {offset} is too large")]
    LengthOverflow {
        /// Position of the first length digit.
        offset: usize,
    },

    /// A leading zero (or negative zero) while decoding in strict mode.
    #[error("non-canonical number at offset {offset}")]
    NonCanonicalNumber {
        /// Position of the first digit (or sign) of the number.
        offset: usize,
    },

    /// A dictionary key that sorts before its predecessor while decoding in strict mode.
    #[error("dictionary keys are not sorted at offset {offset}")]
    UnsortedKeys {
        /// Position of the offending key.
        offset: usize,
    },

    /// A repeated dictionary key while decoding in strict mode.
    #[error("duplicate dictionary key at offset {offset}")]
    DuplicateKey {
        /// Position of the repeated key.
        offset: usize,
    },

    /// The nesting depth limit of the decoder was exceeded.
    #[error("maximum nesting depth of {max_depth} exceeded at offset {offset}")]
    NestingTooDeep {
        /// The configured limit.
        max_depth: usize,
        /// Position of the container that crossed the limit.
        offset: usize,
    },

    /// Input remained after a complete value where none was allowed.
    #[error("trailing data after value at offset {offset}")]
    TrailingData {
        /// Position of the first unconsumed byte.
        offset: usize,
    },
}

impl Error {
    pub(crate) fn unexpected(expected: &'static str, found: u8, offset: usize) -> Self {
        Error::UnexpectedByte {
            expected,
            found,
            offset,
        }
    }

    /// The input offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match *self {
            Error::UnexpectedEof { offset }
            | Error::UnexpectedByte { offset, .. }
            | Error::MissingDigits { offset }
            | Error::LengthOverflow { offset }
            | Error::NonCanonicalNumber { offset }
            | Error::UnsortedKeys { offset }
            | Error::DuplicateKey { offset }
            | Error::NestingTooDeep { offset, .. }
            | Error::TrailingData { offset } => offset,
        }
    }
}

#[cfg(test)]
mod test {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn binary_bytes_are_shown_escaped() {
        let err = Error::unexpected("'0'..'9' or 'e'", 0xff, 4);
        assert_eq!(err.to_string(), r"expected '0'..'9' or 'e', got '\xff' at offset 4");

        let err = Error::unexpected("'0'..'9' or 'e'", b'x', 3);
        assert_eq!(err.to_string(), "expected '0'..'9' or 'e', got 'x' at offset 3");
    }

    #[test]
    fn every_error_has_an_offset() {
        assert_eq!(Error::UnexpectedEof { offset: 5 }.offset(), 5);
        assert_eq!(
            Error::UnexpectedEof { offset: 5 }.to_string(),
            "reached EOF in the middle of a value at offset 5"
        );
    }
}

#[test]
fn decoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}

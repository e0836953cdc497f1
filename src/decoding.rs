//! Decodes bencode into an owned [`Tree`].
//!
//! # Decoding a value
//!
//! The simplest entry point is [`decode`], which reads one value from the front of a slice and
//! advances the slice past it. Anything behind the value stays in the slice, which makes it easy
//! to detect trailing garbage or to read several concatenated values:
//!
//! ```
//! use benc::{decoding::decode, Tree};
//!
//! let mut input: &[u8] = b"i1e4:spam";
//!
//! assert_eq!(decode(&mut input)?, Tree::Integer(1));
//! assert_eq!(decode(&mut input)?, Tree::from("spam"));
//! assert!(input.is_empty());
//! # Ok::<(), benc::decoding::Error>(())
//! ```
//!
//! If the slice is supposed to hold exactly one value, use [`decode_all`] instead.
//!
//! # Permissive and strict decoding
//!
//! By default a few non-canonical encodings are accepted: integers and byte string lengths
//! with leading zeros (`i03e` is 3), negative zero, and dictionaries with unsorted or repeated
//! keys. Dictionaries always come out sorted, and for repeated keys the last value wins. This
//! means re-encoding such input doesn't reproduce it byte for byte.
//!
//! [`decode_strict`] (or [`Decoder::strict`]) rejects all of the above.
//!
//! # Nesting depth limits
//!
//! Decoding recurses once per nested list or dict. To protect against stack exhaustion the
//! decoder refuses input nested deeper than [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH)
//! levels; the limit can be changed with [`Decoder::with_max_depth`].
//!
//! # Error handling
//!
//! Decoding is all or nothing. A failed call never returns a partial tree and never moves the
//! cursor, so the input can be inspected or re-parsed from the same position.

mod decoder;
mod error;

pub use self::{decoder::Decoder, error::Error};

use crate::Tree;

/// Decode one value from the front of `input` with the default (permissive) options.
///
/// On success `input` is advanced past the decoded value; on failure it is left untouched.
pub fn decode(input: &mut &[u8]) -> Result<Tree, Error> {
    let mut decoder = Decoder::new(*input);
    let tree = decoder.decode_next()?.ok_or_else(|| decoder.eof())?;
    *input = decoder.remainder();
    Ok(tree)
}

/// Decode a buffer holding exactly one value with the default (permissive) options.
pub fn decode_all(input: &[u8]) -> Result<Tree, Error> {
    Decoder::new(input).decode_all()
}

/// Decode a buffer holding exactly one value in canonical form.
pub fn decode_strict(input: &[u8]) -> Result<Tree, Error> {
    Decoder::new(input).strict(true).decode_all()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn decode_advances_the_input() {
        let mut input: &[u8] = b"l4:spami42eeREST";
        let tree = decode(&mut input).unwrap();

        assert_eq!(tree, Tree::List(vec![Tree::from("spam"), Tree::Integer(42)]));
        assert_eq!(input, b"REST");
    }

    #[test]
    fn failed_decode_leaves_the_input_alone() {
        let original: &[u8] = b"l4:spami42e";
        let mut input = original;

        assert_eq!(decode(&mut input), Err(Error::UnexpectedEof { offset: 11 }));
        assert_eq!(input, original);
    }

    #[test]
    fn decode_of_empty_input_is_eof() {
        let mut input: &[u8] = b"";
        assert_eq!(decode(&mut input), Err(Error::UnexpectedEof { offset: 0 }));
    }

    #[test]
    fn decode_all_rejects_trailing_data() {
        assert_eq!(
            decode_all(b"lei1e"),
            Err(Error::TrailingData { offset: 2 })
        );
    }

    #[test]
    fn decode_strict_rejects_what_decode_all_accepts() {
        let input = b"d1:bi1e1:ai2ee";

        assert!(decode_all(input).is_ok());
        assert_eq!(
            decode_strict(input),
            Err(Error::UnsortedKeys { offset: 7 })
        );
    }
}

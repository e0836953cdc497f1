use alloc::{collections::BTreeMap, vec::Vec};
use core::cmp::Ordering;

use tracing::{debug, trace};

use crate::{DEFAULT_MAX_DEPTH, Tree, decoding::Error};

/// A bencode decoder
///
/// The decoder reads values from the front of its source buffer and keeps an explicit cursor
/// into it, so several values can be read back to back (see [`Decoder::decode_next()`]) and
/// whatever follows them is still available through [`Decoder::remainder()`].
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    source: &'a [u8],
    offset: usize,
    max_depth: usize,
    strict: bool,
}

impl<'ser> Decoder<'ser> {
    /// Create a new permissive decoder from the given byte array
    pub fn new(buffer: &'ser [u8]) -> Self {
        Decoder {
            source: buffer,
            offset: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }

    /// Set the maximum nesting depth of the decoder. Atoms have depth 0; every list or dict
    /// adds one level. An unlimited-depth decoder may be created using
    /// `with_max_depth(usize::MAX)`, but be warned that deeply nested input will then exhaust
    /// the stack.
    #[must_use]
    pub fn with_max_depth(mut self, new_max_depth: usize) -> Self {
        self.max_depth = new_max_depth;
        self
    }

    /// Reject any input that is not in canonical form: integers and byte string lengths with
    /// leading zeros, negative zero, and dictionaries whose keys are not strictly ascending.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Position of the cursor in the source buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The part of the source buffer that hasn't been consumed yet.
    pub fn remainder(&self) -> &'ser [u8] {
        &self.source[self.offset..]
    }

    /// Decode the next value from the source buffer.
    ///
    /// Returns `Ok(None)` once the whole buffer has been consumed. On failure the cursor is
    /// reset to where it was before the call, so no partially decoded value is ever observed.
    pub fn decode_next(&mut self) -> Result<Option<Tree>, Error> {
        if self.offset == self.source.len() {
            return Ok(None);
        }

        let start = self.offset;
        match self.decode_value(0) {
            Ok(tree) => Ok(Some(tree)),
            Err(err) => {
                trace!(offset = start, error = %err, "failed to decode value");
                self.offset = start;
                Err(err)
            },
        }
    }

    /// Decode exactly one value spanning the whole source buffer.
    pub fn decode_all(mut self) -> Result<Tree, Error> {
        let tree = self.decode_next()?.ok_or_else(|| self.eof())?;

        if self.offset != self.source.len() {
            return Err(Error::TrailingData {
                offset: self.offset,
            });
        }

        Ok(tree)
    }

    /// Running out of input always happens at the end of the source.
    pub(crate) fn eof(&self) -> Error {
        Error::UnexpectedEof {
            offset: self.source.len(),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.offset).copied()
    }

    fn take_byte(&mut self) -> Option<u8> {
        let ret = self.peek_byte();
        if ret.is_some() {
            self.offset += 1;
        }
        ret
    }

    fn take_chunk(&mut self, count: usize) -> Option<&'ser [u8]> {
        match self.offset.checked_add(count) {
            Some(end_pos) if end_pos <= self.source.len() => {
                let ret = &self.source[self.offset..end_pos];
                self.offset = end_pos;
                Some(ret)
            },
            _ => None,
        }
    }

    /// `depth` is the nesting level of the container holding the value (0 at the top).
    fn decode_value(&mut self, depth: usize) -> Result<Tree, Error> {
        let offset = self.offset;
        let token = self.take_byte().ok_or_else(|| self.eof())?;

        match token {
            b'i' => Ok(Tree::Integer(self.decode_integer()?)),
            b'0'..=b'9' => {
                self.offset -= 1;
                Ok(Tree::Bytes(self.decode_bytes()?))
            },
            b'l' | b'd' => {
                let depth = depth + 1;
                if depth > self.max_depth {
                    debug!(offset, max_depth = self.max_depth, "nesting depth exceeded");
                    return Err(Error::NestingTooDeep {
                        max_depth: self.max_depth,
                        offset,
                    });
                }

                if token == b'l' {
                    Ok(Tree::List(self.decode_list(depth)?))
                } else {
                    Ok(Tree::Dict(self.decode_dict(depth)?))
                }
            },
            found => Err(Error::unexpected("'i', 'l', 'd' or '0'..'9'", found, offset)),
        }
    }

    /// Reads the body of an integer; the leading `i` has already been consumed.
    fn decode_integer(&mut self) -> Result<i64, Error> {
        let start = self.offset;
        let negative = self.peek_byte() == Some(b'-');
        if negative {
            self.offset += 1;
        }

        let digits_start = self.offset;
        let mut value: i64 = 0;
        loop {
            match self.peek_byte() {
                Some(c @ b'0'..=b'9') => {
                    // Out of range values wrap around instead of failing
                    value = value.wrapping_mul(10).wrapping_add(i64::from(c - b'0'));
                    self.offset += 1;
                },
                Some(b'e') => break,
                Some(found) => {
                    return Err(Error::unexpected("'0'..'9' or 'e'", found, self.offset));
                },
                None => return Err(self.eof()),
            }
        }

        let digits = &self.source[digits_start..self.offset];
        if digits.is_empty() {
            return Err(Error::MissingDigits {
                offset: self.offset,
            });
        }
        if self.strict && digits[0] == b'0' && (digits.len() > 1 || negative) {
            return Err(Error::NonCanonicalNumber { offset: start });
        }

        // Skip the terminating 'e'
        self.offset += 1;

        Ok(if negative { value.wrapping_neg() } else { value })
    }

    fn decode_length(&mut self) -> Result<usize, Error> {
        let start = self.offset;
        let mut length = Some(0usize);
        loop {
            match self.peek_byte() {
                Some(c @ b'0'..=b'9') => {
                    length = length
                        .and_then(|len| len.checked_mul(10))
                        .and_then(|len| len.checked_add(usize::from(c - b'0')));
                    self.offset += 1;
                },
                Some(b':') => break,
                Some(found) => {
                    return Err(Error::unexpected("'0'..'9' or ':'", found, self.offset));
                },
                None => return Err(self.eof()),
            }
        }

        let digit_count = self.offset - start;
        if digit_count == 0 {
            return Err(Error::MissingDigits {
                offset: self.offset,
            });
        }
        if self.strict && digit_count > 1 && self.source[start] == b'0' {
            return Err(Error::NonCanonicalNumber { offset: start });
        }
        let length = length.ok_or(Error::LengthOverflow { offset: start })?;

        // Skip the ':'
        self.offset += 1;

        Ok(length)
    }

    fn decode_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let length = self.decode_length()?;
        let chunk = self.take_chunk(length).ok_or_else(|| self.eof())?;
        Ok(chunk.to_vec())
    }

    fn decode_list(&mut self, depth: usize) -> Result<Vec<Tree>, Error> {
        let mut list = Vec::new();
        loop {
            match self.peek_byte() {
                Some(b'e') => {
                    self.offset += 1;
                    return Ok(list);
                },
                Some(_) => list.push(self.decode_value(depth)?),
                None => return Err(self.eof()),
            }
        }
    }

    fn decode_dict(&mut self, depth: usize) -> Result<BTreeMap<Vec<u8>, Tree>, Error> {
        let mut dict = BTreeMap::new();
        loop {
            let key_offset = self.offset;
            match self.peek_byte() {
                Some(b'e') => {
                    self.offset += 1;
                    return Ok(dict);
                },
                Some(b'0'..=b'9') => {},
                Some(found) => {
                    return Err(Error::unexpected("byte string key or 'e'", found, key_offset));
                },
                None => return Err(self.eof()),
            }

            let key = self.decode_bytes()?;

            // In strict mode every key is larger than all keys before it, so the last entry of
            // the map is the previous key.
            if self.strict {
                if let Some((last_key, _)) = dict.last_key_value() {
                    match key.as_slice().cmp(last_key.as_slice()) {
                        Ordering::Less => {
                            return Err(Error::UnsortedKeys { offset: key_offset });
                        },
                        Ordering::Equal => {
                            return Err(Error::DuplicateKey { offset: key_offset });
                        },
                        Ordering::Greater => {},
                    }
                }
            }

            let value = self.decode_value(depth)?;
            if dict.insert(key, value).is_some() {
                trace!(offset = key_offset, "duplicate dictionary key, keeping the last value");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use alloc::{format, vec};
    use core::iter;

    use super::*;

    fn decode_ok(msg: &[u8]) -> Tree {
        match Decoder::new(msg).decode_all() {
            Ok(tree) => tree,
            Err(err) => panic!("Unexpected decoding error for {:?}: {}", msg, err),
        }
    }

    fn decode_err_with(decoder: Decoder, err_regex: &str) {
        match decoder.decode_all() {
            Ok(tree) => panic!("Unexpected parse success: {:?}", tree),
            Err(err) => {
                let err = format!("{}", err);
                let err_regex = regex::Regex::new(err_regex).expect("Test regexes should be valid");
                if !err_regex.is_match(&err) {
                    panic!("Unexpected error: {}", err);
                }
            },
        }
    }

    fn decode_err(msg: &[u8], err_regex: &str) {
        decode_err_with(Decoder::new(msg), err_regex);
    }

    fn strict_err(msg: &[u8], err_regex: &str) {
        decode_err_with(Decoder::new(msg).strict(true), err_regex);
    }

    #[test]
    fn simple_dict_should_decode() {
        let tree = decode_ok(b"d3:bari1e3:fooli2ei3eee");

        let mut expected = BTreeMap::new();
        expected.insert(b"bar".to_vec(), Tree::Integer(1));
        expected.insert(
            b"foo".to_vec(),
            Tree::List(vec![Tree::Integer(2), Tree::Integer(3)]),
        );
        assert_eq!(tree, Tree::Dict(expected));
    }

    #[test]
    fn short_dict_should_fail() {
        decode_err(b"d", r"EOF");
    }

    #[test]
    fn short_list_should_fail() {
        decode_err(b"l", r"EOF");
    }

    #[test]
    fn short_int_should_fail() {
        decode_err(b"i12", r"EOF");
    }

    #[test]
    fn negative_numbers_and_zero_should_parse() {
        let mut decoder = Decoder::new(b"i0ei-1e");
        assert_eq!(decoder.decode_next(), Ok(Some(Tree::Integer(0))));
        assert_eq!(decoder.decode_next(), Ok(Some(Tree::Integer(-1))));
        assert_eq!(decoder.decode_next(), Ok(None));
    }

    #[test]
    fn integer_limits_should_parse() {
        assert_eq!(decode_ok(b"i9223372036854775807e"), Tree::Integer(i64::MAX));
        assert_eq!(decode_ok(b"i-9223372036854775808e"), Tree::Integer(i64::MIN));
    }

    #[test]
    fn integer_overflow_wraps() {
        assert_eq!(decode_ok(b"i9223372036854775808e"), Tree::Integer(i64::MIN));
    }

    #[test]
    fn leading_zeros_are_accepted_by_default() {
        assert_eq!(decode_ok(b"i03e"), Tree::Integer(3));
        assert_eq!(decode_ok(b"i-0e"), Tree::Integer(0));
        assert_eq!(decode_ok(b"03:abc"), Tree::Bytes(b"abc".to_vec()));
    }

    #[test]
    fn leading_zeros_are_illegal_when_strict() {
        strict_err(b"i03e", r"non-canonical number at offset 1");
        strict_err(b"i-01e", r"non-canonical number");
        strict_err(b"03:abc", r"non-canonical number at offset 0");
    }

    #[test]
    fn negative_zero_is_illegal_when_strict() {
        strict_err(b"i-0e", r"non-canonical number");
    }

    #[test]
    fn canonical_input_passes_strict_mode() {
        let tree = Decoder::new(b"d1:ai0e1:bli-7e0:ee")
            .strict(true)
            .decode_all()
            .expect("canonical input should decode");
        assert_eq!(tree.get(b"a"), Some(&Tree::Integer(0)));
    }

    #[test]
    fn second_sign_is_illegal() {
        decode_err(b"i--1e", r"got '-' at offset 2");
        decode_err(b"i1-2e", r"got '-' at offset 2");
    }

    #[test]
    fn ints_must_have_bodies() {
        decode_err(b"ie", r"missing digits at offset 1");
        decode_err(b"i-e", r"missing digits at offset 2");
    }

    #[test]
    fn ints_must_be_terminated_by_e() {
        decode_err(b"i12x", r"expected '0'..'9' or 'e', got 'x' at offset 3");
    }

    #[test]
    fn strings_must_have_bodies() {
        decode_err(b"3:", r"EOF");
    }

    #[test]
    fn truncated_strings_should_fail() {
        decode_err(b"5:abc", r"EOF in the middle of a value at offset 5");
    }

    #[test]
    fn binary_garbage_is_reported_escaped() {
        decode_err(b"i1\xFFe", r"got '\xff' at offset 2");
        decode_err(b"\x80", r"got '\x80' at offset 0");
    }

    #[test]
    fn string_lengths_must_be_digits() {
        decode_err(b"3a:abc", r"expected '0'..'9' or ':', got 'a' at offset 1");
    }

    #[test]
    fn huge_string_lengths_should_fail() {
        decode_err(b"99999999999999999999999:abc", r"too large");
    }

    #[test]
    fn strings_are_binary_safe() {
        assert_eq!(
            decode_ok(b"4:\x00\xff:e"),
            Tree::Bytes(vec![0x00, 0xff, b':', b'e'])
        );
    }

    #[test]
    fn map_keys_must_be_strings() {
        decode_err(b"di1ei2ee", r"expected byte string key or 'e', got 'i' at offset 1");
    }

    #[test]
    fn map_keys_must_have_values() {
        decode_err(b"d3:fooe", r"got 'e' at offset 6");
    }

    #[test]
    fn map_keys_are_sorted_on_decode() {
        let tree = decode_ok(b"d3:fooi1e3:bari2ee");
        let keys: Vec<_> = tree.as_dict().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![b"bar".to_vec(), b"foo".to_vec()]);
    }

    #[test]
    fn duplicate_map_keys_keep_the_last_value() {
        let tree = decode_ok(b"d1:ai1e1:ai2ee");
        assert_eq!(tree.as_dict().map(BTreeMap::len), Some(1));
        assert_eq!(tree.get(b"a"), Some(&Tree::Integer(2)));
    }

    #[test]
    fn map_keys_must_ascend_when_strict() {
        strict_err(b"d3:fooi1e3:bari1ee", r"not sorted at offset 9");
    }

    #[test]
    fn map_keys_must_be_unique_when_strict() {
        strict_err(b"d3:fooi1e3:fooi1ee", r"duplicate dictionary key at offset 9");
    }

    #[test]
    fn unknown_tokens_should_fail() {
        decode_err(b"x", r"got 'x' at offset 0");
        decode_err(b"e", r"got 'e' at offset 0");
    }

    #[test]
    fn empty_input_is_eof() {
        assert_eq!(
            Decoder::new(b"").decode_all(),
            Err(Error::UnexpectedEof { offset: 0 })
        );
        assert_eq!(Decoder::new(b"").decode_next(), Ok(None));
    }

    #[test]
    fn trailing_data_should_fail_decode_all() {
        decode_err(b"i1eXYZ", r"trailing data after value at offset 3");
    }

    #[test]
    fn remainder_should_follow_the_cursor() {
        let mut decoder = Decoder::new(b"4:spamrest");
        assert_eq!(decoder.decode_next(), Ok(Some(Tree::from("spam"))));
        assert_eq!(decoder.offset(), 6);
        assert_eq!(decoder.remainder(), b"rest");
    }

    #[test]
    fn failed_decode_should_not_move_the_cursor() {
        let mut decoder = Decoder::new(b"i1eli2e");
        assert_eq!(decoder.decode_next(), Ok(Some(Tree::Integer(1))));
        assert_eq!(decoder.decode_next(), Err(Error::UnexpectedEof { offset: 7 }));
        assert_eq!(decoder.offset(), 3);
        assert_eq!(decoder.remainder(), b"li2e");
    }

    #[test]
    fn recursion_should_be_limited() {
        let mut msg = Vec::new();
        msg.extend(iter::repeat(b'l').take(4096));
        msg.extend(iter::repeat(b'e').take(4096));
        decode_err(&msg, r"nesting depth");
    }

    #[test]
    fn recursion_bounds_should_be_tight() {
        let test_msg = b"lllleeee";
        assert!(Decoder::new(test_msg).with_max_depth(4).decode_all().is_ok());
        assert_eq!(
            Decoder::new(test_msg).with_max_depth(3).decode_all(),
            Err(Error::NestingTooDeep {
                max_depth: 3,
                offset: 3
            })
        );
    }

    #[test]
    fn atoms_need_no_depth() {
        assert_eq!(
            Decoder::new(b"i5e").with_max_depth(0).decode_all(),
            Ok(Tree::Integer(5))
        );
        assert!(Decoder::new(b"le").with_max_depth(0).decode_all().is_err());
    }
}

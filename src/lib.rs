//! Encodes and decodes bencoded structures.
//!
//! Decoding turns a byte buffer into an owned [`Tree`]; encoding turns a [`Tree`] back into
//! bytes. The two directions never call each other and meet only at the tree.
//!
//! By default the decoder is permissive in the same places most deployed bencode is: integers
//! with leading zeros are accepted, and dictionaries whose keys arrive out of order (or
//! repeated) are normalized into ascending key order with the last value winning. A
//! [strict](decoding::Decoder::strict) decoder rejects all of these. The encoder always produces
//! canonical output.
//!
//! ```
//! use benc::{decoding, encoding, Tree};
//!
//! let mut input: &[u8] = b"l4:spami42eetrailing";
//! let tree = decoding::decode(&mut input)?;
//!
//! assert_eq!(tree, Tree::List(vec![Tree::from("spam"), Tree::Integer(42)]));
//! assert_eq!(input, b"trailing");
//! assert_eq!(encoding::encode(&tree)?, b"l4:spami42ee");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test), warn(missing_docs))]

extern crate alloc;

pub mod decoding;
pub mod encoding;
pub mod pretty;
mod tree;

pub use crate::tree::{Kind, Tree};

/// Default maximum nesting depth used by both [`decoding::Decoder`] and [`encoding::Encoder`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

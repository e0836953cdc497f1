//! An encoder for bencode. Guarantees that the output is valid, canonical bencode
//!
//! # Encoding a tree
//!
//! ```
//! use benc::{encoding::encode, Tree};
//!
//! let tree = Tree::List(vec![Tree::from("spam"), Tree::Integer(42)]);
//!
//! assert_eq!(encode(&tree)?, b"l4:spami42ee");
//! # Ok::<(), benc::encoding::Error>(())
//! ```
//!
//! Dictionary entries are always written in ascending byte order of their keys, whatever order
//! they were inserted or decoded in.
//!
//! # Nesting depth limits
//!
//! Like the decoder, the encoder recurses once per nested container and refuses trees nested
//! deeper than [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH). Atoms (integers and byte
//! strings) have depth 0; a list or dict has the depth of its deepest member plus one. To
//! encode deeper trees, construct the [`Encoder`] manually:
//!
//! ```
//! use benc::{encoding::Encoder, Tree};
//!
//! let mut tree = Tree::Integer(0);
//! for _ in 0..1000 {
//!     tree = Tree::List(vec![tree]);
//! }
//!
//! let mut encoder = Encoder::new().with_max_depth(1000);
//! encoder.encode(&tree)?;
//! assert_eq!(encoder.into_output().len(), 2003);
//! # Ok::<(), benc::encoding::Error>(())
//! ```
//!
//! # Error handling
//!
//! Encoding is all or nothing: when a tree can't be encoded nothing is written for it.

mod encoder;
mod error;

pub use self::{encoder::Encoder, error::Error};

use alloc::vec::Vec;

use crate::Tree;

/// Encode a tree with the default encoder settings.
pub fn encode(tree: &Tree) -> Result<Vec<u8>, Error> {
    let mut encoder = Encoder::new();
    encoder.encode(tree)?;
    Ok(encoder.into_output())
}

use alloc::{collections::BTreeMap, string::ToString, vec::Vec};

use tracing::debug;

use crate::{DEFAULT_MAX_DEPTH, Tree, encoding::Error};

/// The actual encoder. Trees are appended to an internal buffer, so several of them can be
/// written back to back into the same stream.
#[derive(Debug)]
pub struct Encoder {
    output: Vec<u8>,
    max_depth: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder {
            output: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Set the max depth of the encoded object
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Append the encoding of `tree` to the output.
    ///
    /// If the tree can't be encoded, nothing is appended.
    pub fn encode(&mut self, tree: &Tree) -> Result<(), Error> {
        let start = self.output.len();
        let ret = self.emit_tree(tree, 0);
        if ret.is_err() {
            self.output.truncate(start);
        }
        ret
    }

    /// Everything encoded so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume the encoder and return the encoded bytes.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// `depth` is the nesting level of the container holding the tree (0 at the top).
    fn emit_tree(&mut self, tree: &Tree, depth: usize) -> Result<(), Error> {
        match tree {
            Tree::Integer(value) => {
                self.emit_int(*value);
                Ok(())
            },
            Tree::Bytes(bytes) => {
                self.emit_bytes(bytes);
                Ok(())
            },
            Tree::List(list) => {
                let depth = self.enter(depth)?;
                self.emit_list(list, depth)
            },
            Tree::Dict(dict) => {
                let depth = self.enter(depth)?;
                self.emit_dict(dict, depth)
            },
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, Error> {
        let depth = depth + 1;
        if depth > self.max_depth {
            debug!(max_depth = self.max_depth, "nesting depth exceeded while encoding");
            return Err(Error::NestingTooDeep {
                max_depth: self.max_depth,
            });
        }
        Ok(depth)
    }

    fn emit_int(&mut self, value: i64) {
        self.output.push(b'i');
        self.output.extend_from_slice(value.to_string().as_bytes());
        self.output.push(b'e');
    }

    fn emit_bytes(&mut self, value: &[u8]) {
        let length = value.len().to_string();
        self.output.extend_from_slice(length.as_bytes());
        self.output.push(b':');
        self.output.extend_from_slice(value);
    }

    fn emit_list(&mut self, list: &[Tree], depth: usize) -> Result<(), Error> {
        self.output.push(b'l');
        for item in list {
            self.emit_tree(item, depth)?;
        }
        self.output.push(b'e');
        Ok(())
    }

    /// Keys come out of the map in ascending byte order, which is exactly the order bencode
    /// requires.
    fn emit_dict(&mut self, dict: &BTreeMap<Vec<u8>, Tree>, depth: usize) -> Result<(), Error> {
        self.output.push(b'd');
        for (key, value) in dict {
            self.emit_bytes(key);
            self.emit_tree(value, depth)?;
        }
        self.output.push(b'e');
        Ok(())
    }
}

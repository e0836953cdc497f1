//! A `Tree` holds one decoded bencode value and owns all of its children.
//!
//! `Tree` can be decoded with [`Tree::from_bencode`] and encoded with [`Tree::to_bencode`]. If
//! the `serde` feature is enabled, it also implements `Serialize` and `Deserialize`.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::{fmt, str};

#[cfg(feature = "serde")]
use serde_ as serde;

#[cfg(feature = "serde")]
use serde::{
    Serialize,
    ser::{SerializeMap, SerializeSeq},
};

use crate::{decoding, encoding, pretty};

/// An owned bencoded value.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Tree {
    /// A signed integer
    Integer(i64),
    /// A byte string; may not be UTF-8
    Bytes(Vec<u8>),
    /// A list of values
    List(Vec<Tree>),
    /// A dictionary mapping byte strings to values, ordered by key
    Dict(BTreeMap<Vec<u8>, Tree>),
}

/// The shape of a [`Tree`], without its payload.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Kind {
    /// See [`Tree::Integer`]
    Integer,
    /// See [`Tree::Bytes`]
    Bytes,
    /// See [`Tree::List`]
    List,
    /// See [`Tree::Dict`]
    Dict,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Integer => "integer",
            Kind::Bytes => "byte string",
            Kind::List => "list",
            Kind::Dict => "dict",
        })
    }
}

impl Tree {
    /// Create a byte string tree
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Tree::Bytes(bytes.into())
    }

    /// Decode a buffer holding exactly one value, using the default decoder settings.
    pub fn from_bencode(bytes: &[u8]) -> Result<Self, decoding::Error> {
        decoding::decode_all(bytes)
    }

    /// Encode this tree using the default encoder settings.
    pub fn to_bencode(&self) -> Result<Vec<u8>, encoding::Error> {
        encoding::encode(self)
    }

    /// Render this tree in the indented, JSON-like debugging format of [`pretty::render`].
    pub fn to_pretty_string(&self) -> String {
        pretty::render(self, 0)
    }

    /// The shape of this tree
    pub fn kind(&self) -> Kind {
        match self {
            Tree::Integer(_) => Kind::Integer,
            Tree::Bytes(_) => Kind::Bytes,
            Tree::List(_) => Kind::List,
            Tree::Dict(_) => Kind::Dict,
        }
    }

    /// The integer, if this is [`Tree::Integer`]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Tree::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The raw bytes, if this is [`Tree::Bytes`]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Tree::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The byte string as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|bytes| str::from_utf8(bytes).ok())
    }

    /// The items, if this is [`Tree::List`]
    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(list) => Some(list),
            _ => None,
        }
    }

    /// Mutable access to the items of a list, for replacing whole subtrees
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Tree>> {
        match self {
            Tree::List(list) => Some(list),
            _ => None,
        }
    }

    /// The entries, if this is [`Tree::Dict`]
    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, Tree>> {
        match self {
            Tree::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Mutable access to the entries of a dict, for replacing whole subtrees
    pub fn as_dict_mut(&mut self) -> Option<&mut BTreeMap<Vec<u8>, Tree>> {
        match self {
            Tree::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Look up `key` in a dict. Returns `None` for missing keys and for trees that aren't dicts.
    pub fn get(&self, key: &[u8]) -> Option<&Tree> {
        self.as_dict().and_then(|dict| dict.get(key))
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pretty_string())
    }
}

macro_rules! impl_from_integer {
    ($($type:ty)*) => {$(
        impl From<$type> for Tree {
            fn from(value: $type) -> Self {
                Tree::Integer(i64::from(value))
            }
        }
    )*}
}

impl_from_integer!(i8 i16 i32 i64 u8 u16 u32);

impl From<&str> for Tree {
    fn from(value: &str) -> Self {
        Tree::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Tree {
    fn from(value: String) -> Self {
        Tree::Bytes(value.into_bytes())
    }
}

impl From<&[u8]> for Tree {
    fn from(value: &[u8]) -> Self {
        Tree::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Tree {
    fn from(value: Vec<u8>) -> Self {
        Tree::Bytes(value)
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(value: Vec<Tree>) -> Self {
        Tree::List(value)
    }
}

impl From<BTreeMap<Vec<u8>, Tree>> for Tree {
    fn from(value: BTreeMap<Vec<u8>, Tree>) -> Self {
        Tree::Dict(value)
    }
}

impl<K: Into<Vec<u8>>, V: Into<Tree>> FromIterator<(K, V)> for Tree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tree::Dict(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use core::fmt::Formatter;

    use serde_bytes::{ByteBuf, Bytes};

    use super::*;

    impl Serialize for Tree {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::ser::Serializer,
        {
            match self {
                Tree::Bytes(string) => serializer.serialize_bytes(string),
                Tree::Integer(int) => serializer.serialize_i64(*int),
                Tree::List(list) => {
                    let mut seed = serializer.serialize_seq(Some(list.len()))?;
                    for value in list {
                        seed.serialize_element(value)?;
                    }
                    seed.end()
                },
                Tree::Dict(dict) => {
                    let mut seed = serializer.serialize_map(Some(dict.len()))?;
                    for (k, v) in dict {
                        let bytes = Bytes::new(k);
                        seed.serialize_entry(bytes, v)?;
                    }
                    seed.end()
                },
            }
        }
    }

    impl<'de> serde::de::Deserialize<'de> for Tree {
        #[inline]
        fn deserialize<D>(deserializer: D) -> Result<Tree, D::Error>
        where
            D: serde::de::Deserializer<'de>,
        {
            deserializer.deserialize_any(Visitor)
        }
    }

    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Tree;

        fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
            formatter.write_str("any valid bencode value")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Tree, E> {
            Ok(Tree::Integer(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Tree, E>
        where
            E: serde::de::Error,
        {
            i64::try_from(value)
                .map(Tree::Integer)
                .map_err(|_| E::custom("integer does not fit into a signed 64 bit value"))
        }

        fn visit_str<E>(self, value: &str) -> Result<Tree, E> {
            Ok(Tree::from(value))
        }

        fn visit_string<E>(self, value: String) -> Result<Tree, E> {
            Ok(Tree::from(value))
        }

        fn visit_bytes<E>(self, value: &[u8]) -> Result<Tree, E> {
            Ok(Tree::from(value))
        }

        fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Tree, E> {
            Ok(Tree::Bytes(value))
        }

        fn visit_seq<V>(self, mut access: V) -> Result<Tree, V::Error>
        where
            V: serde::de::SeqAccess<'de>,
        {
            let mut list = Vec::new();
            while let Some(e) = access.next_element()? {
                list.push(e);
            }
            Ok(Tree::List(list))
        }

        fn visit_map<V>(self, mut access: V) -> Result<Tree, V::Error>
        where
            V: serde::de::MapAccess<'de>,
        {
            let mut map = BTreeMap::new();
            while let Some((k, v)) = access.next_entry::<ByteBuf, Tree>()? {
                map.insert(k.into_vec(), v);
            }
            Ok(Tree::Dict(map))
        }
    }
}

//! Renders a [`Tree`] as indented, JSON-like text for debugging.
//!
//! The output only looks like JSON. Byte strings are inserted between quotes as they are
//! (invalid UTF-8 is replaced with U+FFFD), without any escaping, so a byte string containing
//! a quote or a newline produces output that can't be parsed back.
//!
//! ```
//! use benc::{decoding::decode_all, pretty::render};
//!
//! let tree = decode_all(b"d4:name4:spam4:tagsli1ei2eee")?;
//! assert_eq!(
//!     render(&tree, 0),
//!     "{\n\t\"name\": \"spam\",\n\t\"tags\": [\n\t\t1,\n\t\t2\n\t]\n}"
//! );
//! # Ok::<(), benc::decoding::Error>(())
//! ```

use alloc::string::{String, ToString};

use crate::Tree;

/// Render `tree` as if it were nested `level` containers deep.
///
/// Every list item and dict entry sits on its own line, indented with one tab per nesting
/// level. Dict values follow their key on the same line. Closing brackets line up with the
/// line holding the opening one. Dict entries appear in ascending key order.
pub fn render(tree: &Tree, level: usize) -> String {
    let mut out = String::new();
    write_tree(tree, level, &mut out);
    out
}

fn indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push('\t');
    }
}

fn write_bytes(bytes: &[u8], out: &mut String) {
    out.push('"');
    out.push_str(&String::from_utf8_lossy(bytes));
    out.push('"');
}

fn write_tree(tree: &Tree, level: usize, out: &mut String) {
    match tree {
        Tree::Integer(value) => out.push_str(&value.to_string()),
        Tree::Bytes(bytes) => write_bytes(bytes, out),
        Tree::List(items) if items.is_empty() => out.push_str("[]"),
        Tree::List(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                indent(level + 1, out);
                write_tree(item, level + 1, out);
            }
            out.push('\n');
            indent(level, out);
            out.push(']');
        },
        Tree::Dict(entries) if entries.is_empty() => out.push_str("{}"),
        Tree::Dict(entries) => {
            out.push_str("{\n");
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                indent(level + 1, out);
                write_bytes(key, out);
                out.push_str(": ");
                write_tree(value, level + 1, out);
            }
            out.push('\n');
            indent(level, out);
            out.push('}');
        },
    }
}

//! Human readable dump of a tag tree, in the style of PyNBT.
//!
//! ```text
//! TAG_Compound('hello world'): 2 entries
//! {
//!   TAG_String('name'): Bananrama
//!   TAG_List('scores'): 2 entries of TAG_Int
//!   [
//!     TAG_Int(None): 1
//!     TAG_Int(None): 2
//!   ]
//! }
//! ```
//!
//! The output is deterministic, so dumps can be compared in tests. Names and
//! strings never span lines: control characters and backslashes in them are
//! escaped the way Rust escapes them.
use std::fmt::{self, Display, Write};

use crate::{Tag, TagType, Value};

const INDENT: &str = "  ";

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pretty(f, self, Some(self.name()), 0)
    }
}

fn pad(f: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

/// Write `s` with control characters and backslashes escaped.
fn text(f: &mut impl Write, s: &str) -> fmt::Result {
    for c in s.chars() {
        if c.is_control() || c == '\\' {
            write!(f, "{}", c.escape_default())?;
        } else {
            f.write_char(c)?;
        }
    }
    Ok(())
}

fn join<T: Display>(f: &mut impl Write, values: &[T]) -> fmt::Result {
    f.write_char('[')?;
    for (i, v) in values.iter().enumerate() {
        if i != 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", v)?;
    }
    f.write_char(']')
}

fn entries(n: usize) -> &'static str {
    if n == 1 {
        "entry"
    } else {
        "entries"
    }
}

/// Write one tag at `depth`. List elements have no name and show `None`.
fn pretty(f: &mut impl Write, tag: &Tag, name: Option<&str>, depth: usize) -> fmt::Result {
    pad(f, depth)?;
    match name {
        Some(name) => {
            write!(f, "{}('", tag.type_id())?;
            text(f, name)?;
            f.write_str("'): ")?;
        }
        None => write!(f, "{}(None): ", tag.type_id())?,
    }

    match tag.value() {
        Value::Byte(v) => write!(f, "{}", v),
        Value::Short(v) => write!(f, "{}", v),
        Value::Int(v) => write!(f, "{}", v),
        Value::Long(v) => write!(f, "{}", v),
        Value::Float(v) => write!(f, "{}", v),
        Value::Double(v) => write!(f, "{}", v),
        Value::String(v) => text(f, v),
        Value::ByteArray(v) => {
            write!(f, "{} bytes ", v.len())?;
            join(f, v)
        }
        Value::IntArray(v) => {
            write!(f, "{} ints ", v.len())?;
            join(f, v)
        }
        Value::LongArray(v) => {
            write!(f, "{} longs ", v.len())?;
            join(f, v)
        }
        Value::List(list) => {
            write!(f, "{} {}", list.len(), entries(list.len()))?;
            if list.element_type() != TagType::End {
                write!(f, " of {}", list.element_type())?;
            }
            f.write_char('\n')?;
            pad(f, depth)?;
            f.write_str("[\n")?;
            for node in list {
                pretty(f, &node.read(), None, depth + 1)?;
                f.write_char('\n')?;
            }
            pad(f, depth)?;
            f.write_char(']')
        }
        Value::Compound(compound) => {
            writeln!(f, "{} {}", compound.len(), entries(compound.len()))?;
            pad(f, depth)?;
            f.write_str("{\n")?;
            for node in compound {
                let child = node.read();
                pretty(f, &child, Some(child.name()), depth + 1)?;
                f.write_char('\n')?;
            }
            pad(f, depth)?;
            f.write_char('}')
        }
    }
}

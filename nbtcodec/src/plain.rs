use std::convert::TryFrom;
use std::ops::Index;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::{Compound, List, Node, Tag, TagType, Value};

/// Plain is a complete NBT value made of native Rust values, with no names
/// or tag wrappers. This is what [`PreserveMode::Plain`][crate::PreserveMode]
/// decodes into.
///
/// Numbers keep their width so that they can be interpreted the way they
/// were stored. Compounds keep the order of their entries; when a name is
/// repeated the last value wins.
///
/// ```
/// use nbtcodec::{decode, Plain, PreserveMode, Tag};
/// # use nbtcodec::error::Result;
///
/// # fn main() -> Result<()> {
/// let root = Tag::new_compound(vec![Tag::new_int(42)?.with_name("x")])?;
/// let plain = decode(&root.encode(false)?, PreserveMode::Plain)?.into_plain();
///
/// match &plain {
///     Plain::Compound(map) => assert_eq!(map["x"], Plain::Int(42)),
///     _ => unreachable!(),
/// }
/// assert_eq!(plain["x"], 42);
/// # Ok(())
/// # }
/// ```
///
/// `Plain` serializes with serde as the bare value, so it renders to JSON
/// naturally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Plain {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(Vec<Plain>),
    Compound(IndexMap<String, Plain>),
}

impl Plain {
    /// The tag type this value would be stored as.
    pub fn tag_type(&self) -> TagType {
        match self {
            Plain::Byte(_) => TagType::Byte,
            Plain::Short(_) => TagType::Short,
            Plain::Int(_) => TagType::Int,
            Plain::Long(_) => TagType::Long,
            Plain::Float(_) => TagType::Float,
            Plain::Double(_) => TagType::Double,
            Plain::String(_) => TagType::String,
            Plain::ByteArray(_) => TagType::ByteArray,
            Plain::IntArray(_) => TagType::IntArray,
            Plain::LongArray(_) => TagType::LongArray,
            Plain::List(_) => TagType::List,
            Plain::Compound(_) => TagType::Compound,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Plain::Byte(v) => Some(v as i64),
            Plain::Short(v) => Some(v as i64),
            Plain::Int(v) => Some(v as i64),
            Plain::Long(v) => Some(v),
            Plain::Float(v) => Some(v as i64),
            Plain::Double(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Plain::Byte(v) => Some(v as f64),
            Plain::Short(v) => Some(v as f64),
            Plain::Int(v) => Some(v as f64),
            Plain::Long(v) => Some(v as f64),
            Plain::Float(v) => Some(v as f64),
            Plain::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Plain::String(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a compound entry.
    pub fn get(&self, key: &str) -> Option<&Plain> {
        match self {
            Plain::Compound(map) => map.get(key),
            _ => None,
        }
    }
}

/// Index into a compound by name.
///
/// # Panics
///
/// Panics if this is not a compound or the key is absent. Use
/// [`Plain::get`] to avoid that.
impl Index<&str> for Plain {
    type Output = Plain;

    fn index(&self, key: &str) -> &Plain {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no entry {:?} in {}", key, self.tag_type()),
        }
    }
}

impl From<Value> for Plain {
    fn from(value: Value) -> Self {
        match value {
            Value::Byte(v) => Plain::Byte(v),
            Value::Short(v) => Plain::Short(v),
            Value::Int(v) => Plain::Int(v),
            Value::Long(v) => Plain::Long(v),
            Value::Float(v) => Plain::Float(v),
            Value::Double(v) => Plain::Double(v),
            Value::String(v) => Plain::String(v),
            Value::ByteArray(v) => Plain::ByteArray(v),
            Value::IntArray(v) => Plain::IntArray(v),
            Value::LongArray(v) => Plain::LongArray(v),
            Value::List(l) => Plain::List(
                l.into_nodes()
                    .into_iter()
                    .map(|n| n.into_tag().into_value().into())
                    .collect(),
            ),
            Value::Compound(c) => {
                let nodes = c.into_nodes();
                let mut map = IndexMap::with_capacity(nodes.len());
                for node in nodes {
                    let (name, value) = node.into_tag().into_parts();
                    map.insert(name, value.into());
                }
                Plain::Compound(map)
            }
        }
    }
}

impl From<Tag> for Plain {
    fn from(tag: Tag) -> Self {
        tag.into_value().into()
    }
}

impl Tag {
    /// The native form of this tag's value. The tag's own name is dropped.
    pub fn to_plain(&self) -> Plain {
        self.clone().into()
    }

    /// Like [`Tag::to_plain`] but reuses the tag's storage.
    pub fn into_plain(self) -> Plain {
        self.into()
    }
}

impl From<&Node> for Plain {
    fn from(node: &Node) -> Self {
        node.read().to_plain()
    }
}

impl Plain {
    /// The natural tag value for this plain value. A list takes the type of
    /// its first element, or End when empty.
    fn into_value(self) -> Result<Value> {
        Ok(match self {
            Plain::Byte(v) => Value::Byte(v),
            Plain::Short(v) => Value::Short(v),
            Plain::Int(v) => Value::Int(v),
            Plain::Long(v) => Value::Long(v),
            Plain::Float(v) => Value::Float(v),
            Plain::Double(v) => Value::Double(v),
            Plain::String(v) => Value::String(v),
            Plain::ByteArray(v) => Tag::new_byte_array(v)?.into_value(),
            Plain::IntArray(v) => Tag::new_int_array(v)?.into_value(),
            Plain::LongArray(v) => Tag::new_long_array(v)?.into_value(),
            Plain::List(items) => {
                let element = items.first().map_or(TagType::End, Plain::tag_type);
                let tags = items
                    .into_iter()
                    .map(|p| p.into_value_as(element).map(Tag::new))
                    .collect::<Result<Vec<_>>>()?;
                Value::List(List::from_tags(element, tags)?)
            }
            Plain::Compound(map) => {
                let children = map
                    .into_iter()
                    .map(|(name, p)| Ok(Tag::from_parts(name, p.into_value()?)))
                    .collect::<Result<Vec<_>>>()?;
                Value::Compound(Compound::from_tags(children)?)
            }
        })
    }

    /// Convert to a value of type `ty`, as an element of a list of `ty`.
    pub(crate) fn into_value_as(self, ty: TagType) -> Result<Value> {
        let found = self.tag_type();
        let int = match &self {
            Plain::Byte(v) => Some(i64::from(*v)),
            Plain::Short(v) => Some(i64::from(*v)),
            Plain::Int(v) => Some(i64::from(*v)),
            Plain::Long(v) => Some(*v),
            _ => None,
        };

        Ok(match (ty, int, self) {
            (TagType::Byte, Some(v), _) => Tag::new_byte(v)?.into_value(),
            (TagType::Short, Some(v), _) => Tag::new_short(v)?.into_value(),
            (TagType::Int, Some(v), _) => Tag::new_int(v)?.into_value(),
            (TagType::Long, Some(v), _) => Value::Long(v),
            (TagType::Float, Some(v), _) => Value::Float(v as f32),
            (TagType::Double, Some(v), _) => Value::Double(v as f64),
            (TagType::Double, None, Plain::Float(v)) => Value::Double(f64::from(v)),
            (_, _, other) if found == ty => other.into_value()?,
            _ => {
                return Err(Error::construction(format!(
                    "cannot put {} into list of {}",
                    found, ty
                )))
            }
        })
    }
}

impl TryFrom<Plain> for Tag {
    type Error = Error;

    /// Build the unnamed tag a plain value would decode from.
    fn try_from(plain: Plain) -> Result<Tag> {
        Ok(Tag::new(plain.into_value()?))
    }
}

// ------------- From<T> impls -------------

macro_rules! from {
    ($type:ty, $variant:ident $(, $($part:tt)+)?) => {
        impl From<$type> for Plain {
            fn from(val: $type) -> Self {
                Self::$variant(val$($($part)+)?)
            }
        }
        impl From<&$type> for Plain {
            fn from(val: &$type) -> Self {
                Self::$variant(val.to_owned()$($($part)+)?)
            }
        }
    };
}
from!(i8, Byte);
from!(i16, Short);
from!(i32, Int);
from!(i64, Long);
from!(f32, Float);
from!(f64, Double);
from!(String, String);
from!(&str, String, .to_owned());
from!(Vec<i8>, ByteArray);
from!(Vec<i32>, IntArray);
from!(Vec<i64>, LongArray);

impl From<bool> for Plain {
    fn from(val: bool) -> Self {
        Self::Byte(i8::from(val))
    }
}

// ------------- Comparisons with primitives -------------

fn eq_i64(value: &Plain, other: i64) -> bool {
    value.as_i64().map_or(false, |i| i == other)
}

fn eq_f64(value: &Plain, other: f64) -> bool {
    value.as_f64().map_or(false, |i| i == other)
}

fn eq_str(value: &Plain, other: &str) -> bool {
    value.as_str().map_or(false, |i| i == other)
}

impl PartialEq<str> for Plain {
    fn eq(&self, other: &str) -> bool {
        eq_str(self, other)
    }
}

impl<'a> PartialEq<&'a str> for Plain {
    fn eq(&self, other: &&str) -> bool {
        eq_str(self, other)
    }
}

impl PartialEq<String> for Plain {
    fn eq(&self, other: &String) -> bool {
        eq_str(self, other.as_str())
    }
}

macro_rules! partialeq_numeric {
    ($($eq:ident [$($ty:ty)*])*) => {
        $($(
            impl PartialEq<$ty> for Plain {
                fn eq(&self, other: &$ty) -> bool {
                    $eq(self, *other as _)
                }
            }

            impl PartialEq<Plain> for $ty {
                fn eq(&self, other: &Plain) -> bool {
                    $eq(other, *self as _)
                }
            }
        )*)*
    }
}

partialeq_numeric! {
    eq_i64[i8 i16 i32 i64 isize]
    eq_f64[f32 f64]
}

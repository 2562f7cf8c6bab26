use std::borrow::Cow;
use std::convert::TryFrom;

use crate::error::{Error, Result};
use crate::{Compound, List, Plain, TagType};

/// The payload of a tag. There is one variant per tag type except End, which
/// never carries data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    /// Returns the type of this value.
    pub fn tag_type(&self) -> TagType {
        match self {
            Value::Byte(_) => TagType::Byte,
            Value::Short(_) => TagType::Short,
            Value::Int(_) => TagType::Int,
            Value::Long(_) => TagType::Long,
            Value::Float(_) => TagType::Float,
            Value::Double(_) => TagType::Double,
            Value::ByteArray(_) => TagType::ByteArray,
            Value::String(_) => TagType::String,
            Value::List(_) => TagType::List,
            Value::Compound(_) => TagType::Compound,
            Value::IntArray(_) => TagType::IntArray,
            Value::LongArray(_) => TagType::LongArray,
        }
    }

    /// Copy of this value whose List or Compound children alias the
    /// children of `self`. Scalars and arrays are copied outright.
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::List(l) => Value::List(l.shallow_copy()),
            Value::Compound(c) => Value::Compound(c.shallow_copy()),
            other => other.clone(),
        }
    }
}

macro_rules! from {
    ($type:ty, $variant:ident $(, $($part:tt)+)?) => {
        impl From<$type> for Value {
            fn from(val: $type) -> Self {
                Self::$variant(val$($($part)+)?)
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
from!(List, List);
from!(Compound, Compound);

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Self::Byte(i8::from(val))
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(val: Cow<'a, str>) -> Self {
        Self::String(val.into_owned())
    }
}

/// A single node of an NBT tree: an optional name and a typed value.
///
/// The type of a tag never changes. [`Tag::set_value`] only accepts values
/// of the same type.
///
/// Cloning a tag is a deep copy; see [`Tag::copy`] for the shallow variant.
///
/// ```
/// use nbtcodec::{Tag, TagType};
///
/// # fn main() -> nbtcodec::error::Result<()> {
/// let list = Tag::new_list(TagType::Int, vec![Tag::new_int(1)?, Tag::new_int(2)?])?
///     .with_name("numbers");
///
/// assert_eq!(list.type_id(), TagType::List);
/// assert_eq!(list.name(), "numbers");
/// assert!(list.get_string().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    name: String,
    value: Value,
}

fn check_len(len: usize, ty: TagType) -> Result<()> {
    if i32::try_from(len).is_err() {
        return Err(Error::construction(format!(
            "{} of length {} exceeds maximum of i32::MAX",
            ty, len
        )));
    }
    Ok(())
}

impl Tag {
    /// Create an unnamed tag holding `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            name: String::new(),
            value: value.into(),
        }
    }

    /// Set the name of this tag, consuming and returning it.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn new_byte(value: i64) -> Result<Self> {
        let v = i8::try_from(value).map_err(|_| Error::out_of_range(value, TagType::Byte))?;
        Ok(Self::new(v))
    }

    pub fn new_short(value: i64) -> Result<Self> {
        let v = i16::try_from(value).map_err(|_| Error::out_of_range(value, TagType::Short))?;
        Ok(Self::new(v))
    }

    pub fn new_int(value: i64) -> Result<Self> {
        let v = i32::try_from(value).map_err(|_| Error::out_of_range(value, TagType::Int))?;
        Ok(Self::new(v))
    }

    /// Every `i64` fits, so this cannot fail. It returns `Result` to match
    /// the other integer constructors.
    pub fn new_long(value: i64) -> Result<Self> {
        Ok(Self::new(value))
    }

    pub fn new_float(value: f32) -> Self {
        Self::new(value)
    }

    pub fn new_double(value: f64) -> Self {
        Self::new(value)
    }

    pub fn new_string(value: impl Into<String>) -> Self {
        Self::new(Value::String(value.into()))
    }

    pub fn new_byte_array(values: Vec<i8>) -> Result<Self> {
        check_len(values.len(), TagType::ByteArray)?;
        Ok(Self::new(values))
    }

    pub fn new_int_array(values: Vec<i32>) -> Result<Self> {
        check_len(values.len(), TagType::IntArray)?;
        Ok(Self::new(values))
    }

    pub fn new_long_array(values: Vec<i64>) -> Result<Self> {
        check_len(values.len(), TagType::LongArray)?;
        Ok(Self::new(values))
    }

    /// Create a list of `element` tags. Fails if any item has a different
    /// type, or if `element` is End and `items` is not empty. Names of the
    /// items are discarded.
    pub fn new_list(element: TagType, items: Vec<Tag>) -> Result<Self> {
        Ok(Self::new(List::from_tags(element, items)?))
    }

    /// Create a list of `element` tags from plain values, converting each
    /// one to `element`. Integers must fit its width; integers and floats
    /// widen to Float and Double. Any other value must already have type
    /// `element`.
    ///
    /// ```
    /// # use nbtcodec::{Tag, TagType};
    /// let bands = Tag::new_list_of(TagType::String, ["bandori", "roselia"]).unwrap();
    /// assert_eq!(bands.as_list().unwrap().len(), 2);
    /// assert!(Tag::new_list_of(TagType::Byte, [1, 300]).is_err());
    /// ```
    pub fn new_list_of<I>(element: TagType, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Plain>,
    {
        let items = values
            .into_iter()
            .map(|v| Into::<Plain>::into(v).into_value_as(element).map(Tag::new))
            .collect::<Result<Vec<_>>>()?;
        Self::new_list(element, items)
    }

    /// Create a compound of the given children, in order. Fails if two
    /// children share a name.
    pub fn new_compound(children: Vec<Tag>) -> Result<Self> {
        Ok(Self::new(Compound::from_tags(children)?))
    }

    pub(crate) fn from_parts(name: String, value: Value) -> Self {
        Self { name, value }
    }

    pub(crate) fn into_parts(self) -> (String, Value) {
        (self.name, self.value)
    }

    pub fn type_id(&self) -> TagType {
        self.value.tag_type()
    }

    /// The name of this tag. Empty for list elements and unnamed tags.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replace the value of this tag. The new value must have the same type.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if value.tag_type() != self.type_id() {
            return Err(Error::assign_mismatch(value.tag_type(), self.type_id()));
        }
        self.value = value;
        Ok(())
    }

    pub fn as_list(&self) -> Option<&List> {
        match &self.value {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match &mut self.value {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match &self.value {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match &mut self.value {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Text form of a number or string tag. Fails for lists, compounds and
    /// arrays.
    pub fn get_string(&self) -> Result<String> {
        Ok(match &self.value {
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::String(v) => v.clone(),
            _ => return Err(Error::type_mismatch("string", self.type_id())),
        })
    }

    /// Numeric value of this tag. Strings are accepted if they parse as a
    /// finite number. Longs beyond 2^53 lose precision.
    pub fn get_number(&self) -> Result<f64> {
        Ok(match &self.value {
            Value::Byte(v) => f64::from(*v),
            Value::Short(v) => f64::from(*v),
            Value::Int(v) => f64::from(*v),
            Value::Long(v) => *v as f64,
            Value::Float(v) => f64::from(*v),
            Value::Double(v) => *v,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::type_mismatch("number", TagType::String))?,
            _ => return Err(Error::type_mismatch("number", self.type_id())),
        })
    }

    /// Integer value of this tag.
    ///
    /// **Lossy**: the fractional part of Float and Double values (or of a
    /// numeric string) is truncated toward zero, so `3.9` gives `3` and
    /// `-3.9` gives `-3`. Values beyond the range of `i64` saturate and NaN
    /// gives `0`.
    pub fn get_integer(&self) -> Result<i64> {
        Ok(match &self.value {
            Value::Byte(v) => i64::from(*v),
            Value::Short(v) => i64::from(*v),
            Value::Int(v) => i64::from(*v),
            Value::Long(v) => *v,
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(v) => v,
                Err(_) => self.get_number()?.trunc() as i64,
            },
            _ => self.get_number()?.trunc() as i64,
        })
    }

    /// Copy this tag. A deep copy (`shallow == false`) shares nothing with
    /// `self`. A shallow copy gets its own list or compound, but the slots of
    /// that container alias the children of `self`: editing a child through
    /// either tree is seen by both, while adding, removing or replacing a slot
    /// is not.
    pub fn copy(&self, shallow: bool) -> Tag {
        if shallow {
            Tag {
                name: self.name.clone(),
                value: self.value.shallow_copy(),
            }
        } else {
            self.clone()
        }
    }
}

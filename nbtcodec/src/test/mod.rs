use std::convert::TryFrom;

use crate::TagType;



mod pretty;
mod ser;
mod stream;

macro_rules! check_tags {
    {$($tag:ident = $val:literal),* $(,)?} => {
        $(
            assert_eq!(u8::from(TagType::$tag), $val);
            assert_eq!(TagType::try_from($val as u8), Ok(TagType::$tag));
        )*
    };
}

#[test]
fn exhaustive_tag_check() {
    check_tags! {
        End = 0,
        Byte = 1,
        Short = 2,
        Int = 3,
        Long = 4,
        Float = 5,
        Double = 6,
        ByteArray = 7,
        String = 8,
        List = 9,
        Compound = 10,
        IntArray = 11,
        LongArray = 12,
    }

    for value in 13..=u8::MAX {
        assert!(TagType::try_from(value).is_err())
    }
}

#[test]
fn tag_type_names() {
    assert_eq!(TagType::ByteArray.to_string(), "TAG_Byte_Array");
    assert_eq!(TagType::Compound.name(), "TAG_Compound");
    assert!(TagType::Double.is_numeric());
    assert!(!TagType::String.is_numeric());
}

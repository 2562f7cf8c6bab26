use std::io::{self, Write};

use super::builder::Builder;
use crate::{
    decode, encode,
    error::{ErrorKind, Result},
    from_bytes,
    ser::to_writer,
    EncodeOpts, Encoding, PreserveMode, Tag, TagType,
};

fn sample() -> Result<Tag> {
    Ok(Tag::new_compound(vec![
        Tag::new_byte(1)?.with_name("b"),
        Tag::new_string("Bananrama").with_name("name"),
        Tag::new_list(
            TagType::Compound,
            vec![
                Tag::new_compound(vec![Tag::new_short(-5)?.with_name("s")])?,
                Tag::new_compound(vec![])?,
            ],
        )?
        .with_name("items"),
        Tag::new_list(TagType::End, vec![])?.with_name("empty"),
        Tag::new_int_array(vec![1, 2, 3])?.with_name("ints"),
        Tag::new_long_array(vec![])?.with_name("longs"),
        Tag::new_byte_array(vec![-1, 0, 1])?.with_name("bytes"),
        Tag::new_double(1.5).with_name("d"),
        Tag::new_float(-2.0).with_name("f"),
        Tag::new_long(i64::MAX)?.with_name("l"),
    ])?
    .with_name("root"))
}

#[test]
fn simple_compound() -> Result<()> {
    let tag = Tag::new_compound(vec![
        Tag::new_byte(123)?.with_name("val"),
        Tag::new_int(-7)?.with_name("other"),
    ])?;

    let expected = Builder::new()
        .start_compound("")
        .byte("val", 123)
        .int("other", -7)
        .end_compound()
        .build();

    assert_eq!(tag.encode(false)?, expected);
    Ok(())
}

#[test]
fn full_tree_matches_builder() -> Result<()> {
    let expected = Builder::new()
        .start_compound("root")
        .byte("b", 1)
        .string("name", "Bananrama")
        .start_list("items", TagType::Compound, 2)
        .start_anon_compound()
        .short("s", -5)
        .end_compound()
        .start_anon_compound()
        .end_compound()
        .start_list("empty", TagType::End, 0)
        .int_array("ints", &[1, 2, 3])
        .long_array("longs", &[])
        .byte_array("bytes", &[-1, 0, 1])
        .double("d", 1.5)
        .float("f", -2.0)
        .long("l", i64::MAX)
        .end_compound()
        .build();

    assert_eq!(sample()?.encode(false)?, expected);
    Ok(())
}

#[test]
fn noprefix_scalars() -> Result<()> {
    assert_eq!(Tag::new_byte(-1)?.encode(true)?, [0xff]);
    assert_eq!(Tag::new_short(258)?.encode(true)?, [1, 2]);
    assert_eq!(Tag::new_int(1)?.encode(true)?, [0, 0, 0, 1]);
    assert_eq!(Tag::new_long(-2)?.encode(true)?, (-2i64).to_be_bytes());
    assert_eq!(Tag::new_float(1.0).encode(true)?, 1.0f32.to_be_bytes());
    assert_eq!(Tag::new_double(1.0).encode(true)?, 1.0f64.to_be_bytes());
    assert_eq!(Tag::new_string("hi").encode(true)?, [0, 2, b'h', b'i']);
    Ok(())
}

#[test]
fn noprefix_skips_type_and_name() -> Result<()> {
    let tag = Tag::new_int(5)?.with_name("ignored");
    assert_eq!(tag.encode(true)?, [0, 0, 0, 5]);
    assert_eq!(tag.encode(false)?, Builder::new().int("ignored", 5).build());

    let compound = Tag::new_compound(vec![Tag::new_byte(1)?.with_name("a")])?.with_name("x");
    let expected = Builder::new().byte("a", 1).end_compound().build();
    assert_eq!(compound.encode(true)?, expected);
    Ok(())
}

#[test]
fn list_wire_form() -> Result<()> {
    let tag = Tag::new_list(TagType::Int, vec![Tag::new_int(1)?, Tag::new_int(2)?])?;
    assert_eq!(tag.encode(true)?, [3, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2]);

    let empty = Tag::new_list(TagType::String, vec![])?;
    assert_eq!(empty.encode(true)?, [8, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn free_function_matches_method() -> Result<()> {
    let tag = sample()?;
    assert_eq!(encode(&tag, false)?, tag.encode(false)?);
    assert_eq!(encode(&tag, true)?, tag.encode(true)?);
    Ok(())
}

#[test]
fn roundtrip() -> Result<()> {
    let tag = sample()?;
    let back = decode(&tag.encode(false)?, PreserveMode::Tag)?
        .into_tag()
        .unwrap();
    assert_eq!(back, tag);
    Ok(())
}

#[test]
fn roundtrip_non_compound_root() -> Result<()> {
    let tag = Tag::new_list(
        TagType::List,
        vec![
            Tag::new_list(TagType::Byte, vec![Tag::new_byte(3)?])?,
            Tag::new_list(TagType::End, vec![])?,
        ],
    )?
    .with_name("lists");

    assert_eq!(from_bytes(&tag.encode(false)?)?, tag);
    Ok(())
}

#[test]
fn string_too_long() -> Result<()> {
    let tag = Tag::new_string("a".repeat(u16::MAX as usize + 1));
    let e = tag.encode(false).unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Encode);
    assert!(!e.is_decode());

    let max = Tag::new_string("a".repeat(u16::MAX as usize));
    assert_eq!(max.encode(true)?.len(), 2 + u16::MAX as usize);
    Ok(())
}

#[test]
fn name_too_long() {
    let tag = Tag::new_float(0.0).with_name("n".repeat(70_000));
    let e = tag.encode(false).unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Encode);

    // No name is written without the prefix.
    assert!(tag.encode(true).is_ok());
}

#[test]
fn write_to_matches_encode() -> Result<()> {
    let tag = sample()?;
    let mut out = Vec::new();
    tag.write_to(&mut out, false)?;
    assert_eq!(out, tag.encode(false)?);
    Ok(())
}

#[test]
fn encoded_len_is_exact() -> Result<()> {
    let tag = Tag::new_compound(vec![
        sample()?,
        Tag::new_string("snow\u{0}man \u{2603} \u{1f600}").with_name("ünïcode"),
    ])?;

    for opts in [
        EncodeOpts::new(),
        EncodeOpts::new().encoding(Encoding::JavaCesu8),
    ] {
        for noprefix in [false, true] {
            let bytes = tag.encode_with(noprefix, &opts)?;
            assert_eq!(tag.encoded_len(noprefix, &opts), bytes.len());
        }
    }
    Ok(())
}

#[test]
fn java_cesu8_strings() -> Result<()> {
    let opts = EncodeOpts::new().encoding(Encoding::JavaCesu8);

    let nul = Tag::new_string("\u{0}");
    assert_eq!(nul.encode_with(true, &opts)?, [0, 2, 0xc0, 0x80]);
    assert_eq!(nul.encode(true)?, [0, 1, 0]);

    let ascii = Tag::new_string("plain");
    assert_eq!(ascii.encode_with(true, &opts)?, ascii.encode(true)?);
    Ok(())
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn writer_failure_is_io_error() -> Result<()> {
    let e = to_writer(&sample()?, FailingWriter, false, &EncodeOpts::default()).unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Io);
    assert!(std::error::Error::source(&e).is_some());
    Ok(())
}

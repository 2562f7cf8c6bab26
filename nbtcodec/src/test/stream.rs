use std::io::{self, Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use super::builder::Builder;
use crate::{
    de::Decoder,
    decode, decode_pull, decode_reader,
    error::{BoxError, ErrorKind, Result},
    input::Pull,
    DecodeOpts, PreserveMode, ReadSource, Tag, TagType,
};

fn sample() -> Vec<u8> {
    Builder::new()
        .start_compound("level")
        .string("name", "Bananrama")
        .long_array("heights", &[1, 2, 3, 4, 5, 6, 7, 8])
        .start_list("pos", TagType::Double, 3)
        .double_payload(1.5)
        .double_payload(64.0)
        .double_payload(-3.25)
        .start_compound("data")
        .byte_array("blocks", &[0; 300])
        .int("version", 19133)
        .end_compound()
        .end_compound()
        .build()
}

/// Pull source that hands out `chunk` bytes at a time, or more when asked.
fn chunked(bytes: &[u8], chunk: usize) -> impl FnMut(usize) -> io::Result<Vec<u8>> + '_ {
    let mut pos = 0;
    move |min: usize| {
        let end = (pos + min.max(chunk)).min(bytes.len());
        let out = bytes[pos..end].to_vec();
        pos = end;
        Ok(out)
    }
}

#[test]
fn pull_in_any_chunk_size_matches_buffer() -> Result<()> {
    let bytes = sample();
    let direct = decode(&bytes, PreserveMode::Tag)?;

    for chunk in [1, 2, 3, 7, 64, 1000, 10_000] {
        let pulled = decode_pull(chunked(&bytes, chunk), PreserveMode::Tag)?;
        assert_eq!(direct, pulled, "chunk size {}", chunk);
    }
    Ok(())
}

#[test]
fn pull_plain_mode_matches_buffer() -> Result<()> {
    let bytes = sample();
    let direct = decode(&bytes, PreserveMode::Plain)?;
    let pulled = decode_pull(chunked(&bytes, 5), PreserveMode::Plain)?;
    assert_eq!(direct, pulled);
    Ok(())
}

#[test]
fn pull_requests_are_exact_minimums() -> Result<()> {
    let bytes = Builder::new().int("abc", 7).build();
    let mut requests = Vec::new();
    let mut pos = 0;

    let source = |min: usize| -> io::Result<Vec<u8>> {
        requests.push(min);
        let out = bytes[pos..pos + min].to_vec();
        pos += min;
        Ok(out)
    };
    let tag = decode_pull(source, PreserveMode::Tag)?.into_tag().unwrap();

    assert_eq!(tag, Tag::new_int(7)?.with_name("abc"));
    // type, name length, name, payload
    assert_eq!(requests, [1, 2, 3, 4]);
    Ok(())
}

#[test]
fn surplus_is_kept_between_requests() -> Result<()> {
    let bytes = sample();
    let mut calls = 0;
    let mut once = Some(bytes.clone());

    let source = |_: usize| -> io::Result<Vec<u8>> {
        calls += 1;
        Ok(once.take().unwrap_or_default())
    };
    decode_pull(source, PreserveMode::Tag)?;

    assert_eq!(calls, 1);
    Ok(())
}

#[test]
fn short_pull_is_truncation() {
    let bytes = sample();
    let cut = &bytes[..bytes.len() - 1];

    let e = decode_pull(chunked(cut, 16), PreserveMode::Tag).unwrap_err();
    assert!(e.is_truncation());
    assert_eq!(e.offset(), Some(cut.len() as u64));
}

#[derive(Debug)]
struct Unplugged;

impl std::fmt::Display for Unplugged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("cable unplugged")
    }
}

impl std::error::Error for Unplugged {}

#[test]
fn reader_error_is_the_cause() {
    let bytes = sample();
    let mut served = false;

    let source = |min: usize| -> std::result::Result<Vec<u8>, Unplugged> {
        if served {
            return Err(Unplugged);
        }
        served = true;
        Ok(bytes[..min.max(10)].to_vec())
    };
    let e = decode_pull(source, PreserveMode::Tag).unwrap_err();

    assert_eq!(e.kind(), &ErrorKind::Reader);
    assert!(e.is_decode());
    assert!(e.to_string().contains("cable unplugged"));
    assert_eq!(e.offset(), Some(9));

    let cause = std::error::Error::source(&e).unwrap();
    assert!(cause.downcast_ref::<Unplugged>().is_some());
}

#[test]
fn custom_pull_impl() -> Result<()> {
    struct Countdown {
        bytes: Vec<u8>,
        pulls: usize,
    }

    impl Pull for Countdown {
        fn pull(&mut self, min: usize) -> std::result::Result<Vec<u8>, BoxError> {
            if self.pulls == 0 {
                return Err("out of pulls".into());
            }
            self.pulls -= 1;
            Ok(self.bytes.drain(..min).collect())
        }
    }

    let source = Countdown {
        bytes: Builder::new().byte("b", 1).build(),
        pulls: 4,
    };
    let tag = decode_pull(source, PreserveMode::Tag)?.into_tag().unwrap();
    assert_eq!(tag.get_integer()?, 1);

    let source = Countdown {
        bytes: Builder::new().byte("b", 1).build(),
        pulls: 3,
    };
    let e = decode_pull(source, PreserveMode::Tag).unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Reader);
    Ok(())
}

/// Reader returning a single byte per call, like a slow socket.
struct Trickle<'a>(&'a [u8]);

impl<'a> Read for Trickle<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.0.is_empty() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.0[0];
        self.0 = &self.0[1..];
        Ok(1)
    }
}

#[test]
fn read_source_collects_short_reads() -> Result<()> {
    let bytes = sample();
    let direct = decode(&bytes, PreserveMode::Tag)?;
    let trickled = decode_reader(Trickle(&bytes), PreserveMode::Tag)?;
    assert_eq!(direct, trickled);
    Ok(())
}

#[test]
fn read_source_large_request() -> Result<()> {
    let big: Vec<i64> = (0..4000).collect();
    let bytes = Builder::new().long_array("big", &big).build();

    let tag = decode_reader(bytes.as_slice(), PreserveMode::Tag)?
        .into_tag()
        .unwrap();
    assert_eq!(tag, Tag::new_long_array(big)?.with_name("big"));
    Ok(())
}

#[test]
fn read_source_io_error_is_reader_error() {
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let e = decode_reader(Broken, PreserveMode::Tag).unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Reader);
    let cause = std::error::Error::source(&e).unwrap();
    let inner = cause.downcast_ref::<io::Error>().unwrap();
    assert_eq!(inner.kind(), io::ErrorKind::ConnectionReset);
}

#[test]
fn gzip_stream() -> Result<()> {
    let bytes = sample();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&bytes)?;
    let gz = encoder.finish()?;

    let direct = decode(&bytes, PreserveMode::Tag)?;
    let unzipped = decode_reader(GzDecoder::new(gz.as_slice()), PreserveMode::Tag)?;
    assert_eq!(direct, unzipped);
    Ok(())
}

#[test]
fn decoder_over_read_source_reads_many_roots() -> Result<()> {
    let mut bytes = Builder::new().int("a", 1).build();
    bytes.extend(Builder::new().int("b", 2).build());

    let mut decoder = Decoder::from_pull(ReadSource::new(bytes.as_slice()), DecodeOpts::new());
    let a = decoder.next_tag()?.unwrap();
    let b = decoder.next_tag()?.unwrap();

    assert_eq!(a.name(), "a");
    assert_eq!(b.get_integer()?, 2);
    assert_eq!(decoder.offset(), bytes.len() as u64);
    assert_eq!(decoder.into_inner().buffered(), 0);
    Ok(())
}

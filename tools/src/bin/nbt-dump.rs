use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use clap::{App, Arg};
use env_logger::Env;
use flate2::read::GzDecoder;
use log::{debug, error};
use nbtcodec::de::Decoder;
use nbtcodec::{DecodeOpts, Decoded, Encoding, PreserveMode, ReadSource};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path`, or stdin for `-`, gunzipping unless `raw` is set or the data
/// does not start with the gzip magic.
fn open(path: &str, raw: bool) -> Result<Box<dyn Read>> {
    let input: Box<dyn Read> = if path == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(path)?)
    };

    let mut input = BufReader::new(input);
    let gzipped = input.fill_buf()?.starts_with(&GZIP_MAGIC);

    if gzipped && !raw {
        debug!("{} is gzip compressed", path);
        Ok(Box::new(GzDecoder::new(input)))
    } else {
        Ok(Box::new(input))
    }
}

fn run() -> Result<()> {
    let matches = App::new("nbt-dump")
        .about("print the contents of an NBT file")
        .arg(
            Arg::with_name("file")
                .required(true)
                .help("NBT file to read, or - for stdin"),
        )
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .short("m")
                .takes_value(true)
                .possible_values(&["tag", "plain"])
                .default_value("tag")
                .help("tag prints the tag tree, plain prints the values as JSON"),
        )
        .arg(
            Arg::with_name("raw")
                .long("raw")
                .takes_value(false)
                .help("do not gunzip the input"),
        )
        .arg(
            Arg::with_name("java")
                .long("java")
                .takes_value(false)
                .help("strings use Java's modified UTF-8"),
        )
        .get_matches();

    let path = matches.value_of("file").unwrap_or("-");
    let mode: PreserveMode = matches.value_of("mode").unwrap_or("tag").parse()?;

    let mut opts = DecodeOpts::new();
    if matches.is_present("java") {
        opts = opts.encoding(Encoding::JavaCesu8);
    }

    let input = open(path, matches.is_present("raw"))?;
    let mut decoder = Decoder::from_pull(ReadSource::new(input), opts);

    match decoder.decode(mode)? {
        Decoded::Tag(tag) => println!("{}", tag),
        Decoded::Plain(plain) => println!("{}", serde_json::to_string_pretty(&plain)?),
    }
    debug!("decoded {} bytes", decoder.offset());

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

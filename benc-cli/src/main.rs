use std::ffi::OsString;
use std::fs::{read, write};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use benc::{DEFAULT_MAX_DEPTH, decoding::Decoder, encoding::Encoder};
use clap::{ArgAction, Parser};
use tracing::{Level, debug};

#[derive(Debug, Clone, Parser)]
#[command(version, about="benc\n\n\
    Decodes one bencoded value, given either as a command line argument or as a file,\n\
    and prints it as an indented tree.")]
struct Args {
    /// Bencode to decode, given on the command line. Taken byte for byte, so it need not be
    /// UTF-8.
    #[arg(
        conflicts_with = "input",
        required_unless_present = "input",
        value_parser = clap::value_parser!(OsString)
    )]
    text: Option<OsString>,

    /// Read the bencode from this file instead of the command line.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also print the input left over after the decoded value.
    #[arg(short, long)]
    remainder: bool,

    /// Reject non-canonical bencode (leading zeros, unsorted or repeated dict keys).
    #[arg(short, long)]
    strict: bool,

    /// Print the value re-encoded as canonical bencode instead of as a tree.
    #[arg(short, long)]
    encode: bool,

    /// Maximum nesting depth of lists and dicts.
    #[arg(long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log more details to stderr. Repeat for even more.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let (input, source) = match (&args.text, &args.input) {
        (Some(text), None) => (text.clone().into_encoded_bytes(), "argument".to_string()),
        (None, Some(path)) => (
            read(path).context(format!("Could not read file from path: {:?}", path))?,
            path.display().to_string(),
        ),
        _ => bail!("Exactly one of TEXT and --input must be given"),
    };
    debug!(%source, len = input.len(), "read input");

    // Nothing is written until the whole output exists, so a failed run leaves an existing
    // output file alone.
    let mut rendered = Vec::new();
    render(&args, &input, &source, &mut rendered)?;

    match &args.output {
        Some(path) => write(path, &rendered)
            .context(format!("Could not write output file: {:?}", path))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered).context("Could not write output")?;
            stdout.flush().context("Could not write output")?;
        },
    }

    Ok(())
}

fn render(args: &Args, input: &[u8], source: &str, out: &mut Vec<u8>) -> Result<()> {
    let mut decoder = Decoder::new(input)
        .with_max_depth(args.max_depth)
        .strict(args.strict);
    let tree = decoder
        .decode_next()
        .and_then(|tree| {
            tree.ok_or(benc::decoding::Error::UnexpectedEof {
                offset: input.len(),
            })
        })
        .context(format!("Could not parse {} as bencode", source))?;

    if args.encode {
        let mut encoder = Encoder::new().with_max_depth(args.max_depth);
        encoder
            .encode(&tree)
            .context("Could not re-encode the decoded value")?;
        out.write_all(encoder.output())?;
        out.write_all(b"\n")?;
    } else {
        writeln!(out, "{}", tree)?;
    }

    if args.remainder {
        out.write_all(b"Remainder: ")?;
        out.write_all(decoder.remainder())?;
        out.write_all(b"\n")?;
    }

    Ok(())
}

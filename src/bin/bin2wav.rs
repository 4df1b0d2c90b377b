use std::env;

use anyhow::{bail, Result};

use tracetools::pcm::stack_channels;
use tracetools::rawio::load_raw_set;
use tracetools::wavout::{write_wav, SampleRate};

const HELP: &str = "usage: bin2wav [raw file] ...";

// fixed acquisition rate of the recording hardware (hz)
const SAMPLE_RATE: SampleRate = 40_000;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", HELP);
        return Ok(());
    }

    let (buffers, stem) = load_raw_set(&args[1..])?;
    let Some(stem) = stem else {
        bail!("cannot derive an output name from '{}'", args[1]);
    };
    let channels = stack_channels(&buffers)?;
    let out = format!("{}.wav", stem);
    write_wav(&out, &channels, SAMPLE_RATE)?;
    println!("wrote {} ({} channel(s))", out, channels.nrows());
    Ok(())
}

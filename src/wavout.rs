use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use ndarray::{Array2, Axis};

use crate::error::Result;

pub type ChannelCount = u16;
pub type SampleRate = u32;

/// Write a channels x samples matrix as a 16-bit signed PCM WAV file.
/// Frames are interleaved across channels, so the channel axis is
/// transposed relative to the in-memory layout.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    channels: &Array2<i16>,
    rate: SampleRate,
) -> Result<()> {
    let spec = WavSpec {
        channels: channels.nrows() as ChannelCount,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for frame in channels.axis_iter(Axis(1)) {
        for &sample in frame.iter() {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;
    Ok(())
}

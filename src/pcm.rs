use log::warn;
use ndarray::{Array1, Array2};
use num_traits::Float;

use crate::error::{Result, TraceError};
use crate::rawio::Sample;

/// full scale of a signed 16-bit sample
const FULL_SCALE: f64 = 32768.0;

/// peak absolute amplitude of a buffer
pub fn peak<T: Float>(buf: &[T]) -> T {
    buf.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
}

/// Rescale a buffer to the full signed 16-bit range using its own peak.
/// The sample at the positive peak saturates and is clamped to 32767.
pub fn normalize(buf: &[Sample]) -> Result<Vec<i16>> {
    let peak = peak(buf) as f64;
    if peak == 0.0 {
        return Err(TraceError::DegenerateBuffer);
    }
    let scale = FULL_SCALE / peak;
    let out = buf
        .iter()
        .map(|&x| {
            let v = (x as f64 * scale).round();
            if v > i16::MAX as f64 {
                warn!("sample {} clips at full scale", x);
                i16::MAX
            } else if v < i16::MIN as f64 {
                i16::MIN
            } else {
                v as i16
            }
        })
        .collect();
    Ok(out)
}

/// Normalize each buffer independently (per-channel peaks, deliberately
/// not a shared one) and stack them channels x samples.
pub fn stack_channels(buffers: &[Vec<Sample>]) -> Result<Array2<i16>> {
    let nsamp = buffers.first().map_or(0, Vec::len);
    let mut out = Array2::zeros((buffers.len(), nsamp));
    for (ch, buf) in buffers.iter().enumerate() {
        if buf.len() != nsamp {
            return Err(TraceError::ChannelMismatch(nsamp, buf.len()));
        }
        out.row_mut(ch).assign(&Array1::from(normalize(buf)?));
    }
    Ok(out)
}

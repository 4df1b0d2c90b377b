use std::fs;
use std::path::Path;

use crate::error::{Result, TraceError};

/// sample type stored in the raw recording files
pub type Sample = f32;

/// Read one raw file: headerless little-endian f32 samples, DC removed.
pub fn load_raw<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>> {
    let bytes = fs::read(&path)?;
    if bytes.len() % 4 != 0 {
        return Err(TraceError::TruncatedRaw {
            path: path.as_ref().to_path_buf(),
            len: bytes.len() as u64,
        });
    }
    let mut samples: Vec<Sample> = bytes
        .chunks_exact(4)
        .map(|b| Sample::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    remove_dc(&mut samples);
    Ok(samples)
}

/// Read every raw file, returning the buffers and the first file's stem
/// (used to name the output WAV).
pub fn load_raw_set<P: AsRef<Path>>(paths: &[P]) -> Result<(Vec<Vec<Sample>>, Option<String>)> {
    let buffers = paths
        .iter()
        .map(load_raw)
        .collect::<Result<Vec<_>>>()?;
    let stem = paths
        .first()
        .and_then(|p| p.as_ref().file_stem())
        .map(|s| s.to_string_lossy().into_owned());
    Ok((buffers, stem))
}

/// subtract the mean so the signal is centered at zero
pub fn remove_dc(samples: &mut [Sample]) {
    if samples.is_empty() {
        return;
    }
    let mean = samples.iter().fold(0.0_f64, |acc, &x| acc + x as f64) / samples.len() as f64;
    for x in samples.iter_mut() {
        *x -= mean as Sample;
    }
}

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Everything that can go wrong in the trace tools.
///
/// There is no recovery anywhere: these are single-shot operator tools,
/// so every variant is fatal and propagates to main.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around errors from the WAV writing library.
    #[error(transparent)]
    Wav(#[from] hound::Error),

    /// Data line with a different number of numeric fields than the first one.
    #[error("line {line}: expected {expected} data columns, got {got}")]
    RaggedRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    /// A `#Key` marker was seen but no key rows followed it.
    #[error("key table is empty")]
    EmptyKeyTable,

    /// Raw sample file whose size is not a whole number of f32 samples.
    #[error("{}: file size {len} is not a multiple of 4", .path.display())]
    TruncatedRaw { path: PathBuf, len: u64 },

    /// Key table announces more trace columns than the data rows carry.
    #[error("key table announces {expected} data columns but rows have {got}")]
    ColumnCount { expected: usize, got: usize },

    /// Header field the renderer needs but the file does not provide.
    #[error("header field '{0}' not found")]
    MissingField(String),

    /// All-zero buffer has no peak to normalize against.
    #[error("buffer is silent, cannot normalize")]
    DegenerateBuffer,

    /// Channel buffers of different lengths cannot be interleaved.
    #[error("channel length mismatch: {0} vs {1}")]
    ChannelMismatch(usize, usize),

    /// Error raised by the plotters backend while drawing.
    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("print pipeline exited with {0}")]
    PrintPipeline(ExitStatus),
}

pub type Result<T> = std::result::Result<T, TraceError>;

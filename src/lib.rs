pub mod datafile;
pub mod error;
pub mod pcm;
pub mod plot;
pub mod rawio;
pub mod wavout;

pub use error::{Result, TraceError};

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while encoding requests or touching the preset file.
///
/// Transmit failures are not errors; they are reported as a
/// [`SendOutcome`](crate::transport::SendOutcome) value instead.
#[derive(Debug, Error)]
pub enum NodeToolError {
    /// A traction profile must carry exactly one PID triple per mode.
    #[error("traction profile must have exactly {expected} modes, found {found}")]
    MalformedProfile { expected: usize, found: usize },

    /// No encoding rule exists for this kind of request.
    #[error("no frame encoding exists for {0} requests")]
    UnsupportedRequest(&'static str),

    /// The preset file exists but does not hold mode-keyed PID records.
    #[error("preset file {} is corrupt: {source}", path.display())]
    CorruptPresetFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Wrapper around IO errors while reading or writing the preset file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NodeToolError>;

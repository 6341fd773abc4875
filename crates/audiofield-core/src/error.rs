use thiserror::Error;

/// Audio bytes could not be turned into a playable buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed audio data: {0}")]
    Malformed(String),

    #[error("unsupported audio format: {0}")]
    Unsupported(String),

    #[error("audio data contains no samples")]
    Empty,

    /// Decoding was refused by a platform decoder (e.g. a rejected browser promise).
    #[error("decoder rejected audio data: {0}")]
    Rejected(String),
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::Unsupported => DecodeError::Unsupported("wav variant".into()),
            hound::Error::FormatError(msg) => DecodeError::Malformed(msg.into()),
            hound::Error::IoError(e) => DecodeError::Malformed(e.to_string()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

/// `play()` was requested with nothing loaded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no audio buffer loaded")]
pub struct NoBufferError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    #[error(transparent)]
    NoBuffer(#[from] NoBufferError),

    /// A buffer is loaded but the platform refused to start it.
    #[error("playback could not start: {0}")]
    Backend(String),
}

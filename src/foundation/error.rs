/// Convenience result type used across ledanim.
pub type LedAnimResult<T> = Result<T, LedAnimError>;

/// Top-level error taxonomy used by the codec, document, preview and upload APIs.
#[derive(thiserror::Error, Debug)]
pub enum LedAnimError {
    /// File or byte-stream read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port could not be opened, configured, read or written.
    #[error("port error: {0}")]
    Port(String),

    /// The controller did not echo the full payload before the deadline.
    #[error("protocol timeout: received {received} of {expected} echo bytes")]
    ProtocolTimeout {
        /// Payload length that was sent.
        expected: usize,
        /// Echo bytes received before the deadline.
        received: usize,
    },

    /// An echoed byte differs from the byte that was sent.
    #[error("integrity mismatch at byte {index}: sent {sent:#04x}, received {received:#04x}")]
    IntegrityMismatch {
        /// Offset of the first differing byte within the payload.
        index: usize,
        /// Byte that was sent.
        sent: u8,
        /// Byte that came back.
        received: u8,
    },

    /// Malformed or truncated encoded animation.
    #[error("decode error: {0}")]
    Decode(String),

    /// Animation or option values outside their encodable domain.
    #[error("validation error: {0}")]
    Validation(String),

    /// A second upload was requested while one is still in flight.
    #[error("busy: {0}")]
    Busy(String),

    /// Errors when serializing or deserializing JSON interchange and config.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedAnimError {
    /// Build a [`LedAnimError::Port`] value.
    pub fn port(msg: impl Into<String>) -> Self {
        Self::Port(msg.into())
    }

    /// Build a [`LedAnimError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LedAnimError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LedAnimError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Build a [`LedAnimError::Io`] value that names the file involved.
    ///
    /// The error kind of `source` is kept so callers can still match on it.
    pub fn io_at(action: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            source.kind(),
            format!("{action} '{}': {source}", path.display()),
        ))
    }

    /// Build a [`LedAnimError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

//! Error Types

use std::fmt;
use thiserror::Error;

// ============= Sink Errors =============

/// Errors raised while streaming bytes into the destination sink
#[derive(Debug)]
pub enum SinkError {
    /// Sink accepted zero bytes before the message was complete
    Closed {
        written: usize,
        expected: usize,
    },
    /// Sink reported a write failure
    Write(std::io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed { written, expected } => {
                write!(f, "sink closed after {} of {} bytes", written, expected)
            }
            Self::Write(e) => {
                write!(f, "sink write failed: {}", e)
            }
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Write(e) => Some(e),
            Self::Closed { .. } => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Write(err)
    }
}

// ============= Main Errors =============

#[derive(Error, Debug)]
pub enum SmuggleError {
    // ============= Codec Errors =============

    #[error("Out of bounds: {width}-byte field at offset {offset} exceeds buffer of {len} bytes")]
    Bounds { offset: usize, width: usize, len: usize },

    // ============= ClientHello Errors =============

    #[error("Malformed ClientHello: {0}")]
    MalformedHello(String),

    #[error("Length field overflow: {field} {current} + {delta} > {max}")]
    FieldOverflow {
        field: &'static str,
        current: usize,
        delta: usize,
        max: usize,
    },

    #[error("Buffer too small for padding extension: need {needed} bytes, capacity {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    // ============= Sink Errors =============

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    // ============= Network Errors =============

    #[error("Connection timeout to {addr}")]
    ConnectionTimeout { addr: String },

    #[error("Connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============= Input Errors =============

    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl SmuggleError {
    /// True when bytes may already have reached the peer. The connection
    /// carries an inconsistent prefix and must be closed, never reused.
    pub fn poisons_connection(&self) -> bool {
        matches!(self, Self::Sink(_))
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedHello(reason.into())
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, SmuggleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::Closed { written: 12, expected: 517 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("517"));

        let err = SinkError::Write(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_poisons_connection() {
        let err = SmuggleError::from(SinkError::Closed { written: 3, expected: 9 });
        assert!(err.poisons_connection());

        assert!(!SmuggleError::malformed("bad").poisons_connection());
        assert!(!SmuggleError::BufferTooSmall { needed: 8, capacity: 4 }.poisons_connection());
        assert!(!SmuggleError::ConnectionTimeout { addr: "1.2.3.4:443".into() }.poisons_connection());
    }

    #[test]
    fn test_error_display() {
        let err = SmuggleError::FieldOverflow {
            field: "extensions",
            current: 0xFFFE,
            delta: 5,
            max: 0xFFFF,
        };
        let text = err.to_string();
        assert!(text.contains("extensions"));
        assert!(text.contains("65534"));

        let err = SmuggleError::ConnectionTimeout { addr: "1.2.3.4:443".into() };
        assert!(err.to_string().contains("1.2.3.4:443"));
    }
}

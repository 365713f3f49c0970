use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device request timed out")]
    Timeout,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Failure reported by the status proxy as `{error, details}`.
    #[error("proxy returned {status}: {error} ({details})")]
    Proxy {
        status: u16,
        error: String,
        details: String,
    },
    #[error("device returned HTTP {0}")]
    Status(u16),
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("missing field {0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;

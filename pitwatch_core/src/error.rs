use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    #[error("source unreachable: {0}")]
    SourceUnreachable(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("timeout waiting for source")]
    Timeout,
    #[error("export error: {0}")]
    Export(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

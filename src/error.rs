//! Unified error types for the motor server firmware.
//!
//! A single `Error` enum that every subsystem converts into.  Request-level
//! variants ([`NotFound`], [`ValidationError`]) carry the exact message the
//! HTTP API returns, so the router can turn them into responses without a
//! second lookup table.  All variants are `Copy`.

use core::fmt;

pub use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.  Fatal at startup.
    Config(ConfigError),
    /// Unknown motor or route.
    NotFound(NotFound),
    /// Request body failed validation.
    Validation(ValidationError),
    /// The connection to the client failed.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NotFound(e) => write!(f, "not found: {e}"),
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Lookup errors (404)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// The path named a motor that is not registered.
    Motor,
    /// No route matches the method and path.
    Route,
}

impl NotFound {
    /// Message reported in the `error` field of the response body.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Motor => "Motor not found",
            Self::Route => "Not found",
        }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<NotFound> for Error {
    fn from(e: NotFound) -> Self {
        Self::NotFound(e)
    }
}

// ---------------------------------------------------------------------------
// Validation errors (400)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Body absent or has no `speed` key.
    MissingSpeed,
    /// `speed` is present but not a finite number.
    InvalidSpeed,
}

impl ValidationError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingSpeed => "Missing speed parameter",
            Self::InvalidSpeed => "Invalid speed value",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Binding the listening socket failed.
    BindFailed,
    /// Accepting a connection failed for a reason other than "no client".
    AcceptFailed,
    /// Socket read failed or timed out.
    ReadFailed,
    /// Socket write failed.
    WriteFailed,
    /// The peer closed the connection before sending a request.
    ConnectionClosed,
    /// No parseable request line.
    MalformedRequest,
    /// Request exceeded the configured size limit.
    RequestTooLarge,
    /// The response body could not be serialized.
    EncodeFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindFailed => write!(f, "bind failed"),
            Self::AcceptFailed => write!(f, "accept failed"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::ConnectionClosed => write!(f, "connection closed by peer"),
            Self::MalformedRequest => write!(f, "malformed request"),
            Self::RequestTooLarge => write!(f, "request too large"),
            Self::EncodeFailed => write!(f, "response encoding failed"),
        }
    }
}

impl core::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `lightgrid` library.
//!
//! This module provides the error hierarchy for value validation, device
//! communication, configuration parsing, music-service authentication and
//! artwork summarization.
//!
//! None of these errors is fatal to the process: the worst outcome of any
//! failure inside the orchestration engine is that the lights do not update
//! for one cycle.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to a device or remote service.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing configuration or stored credentials.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error reported by a light device.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Music-service authentication failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Artwork could not be reduced to a single color.
    #[error("summarize error: {0}")]
    Summarize(#[from] SummarizeError),

    /// File system access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid hex color string was provided.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// A color flow was requested without any colors.
    #[error("a color flow needs at least one color")]
    EmptyFlow,

    /// A color flow step was given a zero transition time.
    #[error("color flow step duration must be greater than zero")]
    ZeroDuration,
}

/// Errors related to network communication with devices or services.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote side answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Connection to the device or service failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing configuration, settings and credential files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing.
    #[error("missing field: {0}")]
    MissingField(String),

    /// Unexpected document format.
    #[error("unexpected format: {0}")]
    UnexpectedFormat(String),
}

/// Errors reported by individual light devices.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device is not connected.
    #[error("device is not connected")]
    NotConnected,

    /// Command was rejected by the device.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// Device could not be reached.
    #[error("device unreachable: {0}")]
    Unreachable(String),
}

/// Errors related to music-service authentication.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Client id or client secret are not configured.
    #[error("client id and client secret must be configured")]
    MissingClientCredentials,

    /// The interactive authorization flow did not produce credentials.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Refreshing expired credentials failed.
    #[error("credential refresh failed: {0}")]
    RefreshFailed(String),

    /// Stored credentials were rejected by the service.
    #[error("credentials rejected: {0}")]
    Rejected(String),
}

/// Errors related to reducing artwork to a single color.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    /// The summarizer cannot decode this image format.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The pixel buffer does not match its declared dimensions.
    #[error("pixel buffer of {actual} bytes does not match {width}x{height} RGBA")]
    InvalidDimensions {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Actual buffer length in bytes.
        actual: usize,
    },

    /// Every pixel was filtered out as near-white or near-black.
    #[error("no opaque pixels left after filtering")]
    NoOpaquePixels,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

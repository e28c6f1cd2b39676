// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `beeclear` library.
//!
//! Failures are split by layer: [`ProtocolError`] for the transport,
//! [`ParseError`] for decoding and projecting responses, and [`Error`] for
//! everything a session operation can surface to its caller.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// An authenticated operation was attempted before a successful login.
    #[error("not logged in")]
    NotLoggedIn,

    /// The HTTP exchange itself failed (connection, DNS, timeout).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The device answered with a status code other than 200.
    #[error("HTTP request failed. Status code: {0}")]
    Status(u16),

    /// The device answered with something other than `text/json`.
    #[error("invalid content-type. Expected text/json but received {0}")]
    ContentType(String),

    /// The response body could not be decoded or projected.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The device is reachable but has no smart meter on its P1 port.
    #[error("P1 is not connected")]
    MeterNotConnected,
}

/// Errors related to the HTTP transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the device failed (refused, reset, unresolvable).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request was aborted because it did not complete in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid host or port.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A header value (such as a stored cookie) is not valid HTTP header text.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

/// Errors related to decoding device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A short meter reading yielded neither a power nor a gas timestamp.
    #[error("error parsing meter info")]
    MeterReadings,
}

impl Error {
    /// Returns `true` if the device answered but the body was not valid JSON.
    #[must_use]
    pub fn is_malformed_json(&self) -> bool {
        matches!(self, Self::Parse(ParseError::Json(_)))
    }

    /// Returns the HTTP status code carried by a [`Error::Status`] failure.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_contains_code() {
        let err = Error::Status(404);
        assert_eq!(err.to_string(), "HTTP request failed. Status code: 404");
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn content_type_error_display() {
        let err = Error::ContentType("text/html".to_string());
        assert_eq!(
            err.to_string(),
            "invalid content-type. Expected text/json but received text/html"
        );
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn malformed_json_is_classified() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: Error = ParseError::from(json_err).into();
        assert!(err.is_malformed_json());
        assert!(!Error::NotLoggedIn.is_malformed_json());
        assert!(!Error::Parse(ParseError::MeterReadings).is_malformed_json());
    }

    #[test]
    fn timeout_display() {
        let err: Error = ProtocolError::Timeout(4000).into();
        assert_eq!(
            err.to_string(),
            "protocol error: request timed out after 4000 ms"
        );
    }

    #[test]
    fn meter_errors_display() {
        assert_eq!(Error::MeterNotConnected.to_string(), "P1 is not connected");
        assert_eq!(
            ParseError::MeterReadings.to_string(),
            "error parsing meter info"
        );
    }
}

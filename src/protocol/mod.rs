// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport layer for talking to BeeClear devices.
//!
//! A transport performs exactly one HTTP or HTTPS request/response cycle and
//! knows nothing about sessions, cookies or JSON. [`HttpTransport`] is the
//! production implementation; anything implementing [`Transport`] can be
//! plugged into a [`Session`](crate::Session).

mod http;

pub use http::HttpTransport;

use std::net::{IpAddr, Ipv6Addr};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AsHeaderName, HeaderMap, SET_COOKIE};

use crate::config::SessionConfig;
use crate::error::ProtocolError;

/// A single request to be sent by a [`Transport`].
///
/// The request body is always empty.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Absolute path, including any query string.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Whether to use HTTPS.
    pub tls: bool,
    /// Time after which the request is aborted.
    pub timeout: Duration,
}

impl ExchangeRequest {
    /// Creates a plain HTTP `GET` request with no headers and the default timeout.
    #[must_use]
    pub fn get(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            tls: false,
            timeout: SessionConfig::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Selects HTTPS (`true`) or plain HTTP (`false`).
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the full URL for this request.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        let host = if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("{scheme}://{host}:{}{}", self.port, self.path)
    }

    /// Returns the path without its query string.
    ///
    /// Login requests carry credentials in the query, so only this part is logged.
    #[must_use]
    pub fn log_path(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }
}

/// The complete response to an [`ExchangeRequest`].
#[derive(Debug, Clone)]
pub struct Exchange {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl Exchange {
    /// Creates a new exchange result.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns all response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if present and valid text.
    #[must_use]
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the cookie to send back, built from every `set-cookie` header.
    ///
    /// Only the `name=value` part of each header is kept; attributes such as
    /// `Path` or `HttpOnly` are dropped. Returns `None` if the response set no
    /// cookie.
    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        let pairs: Vec<&str> = self
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// Trait for transports that can carry requests to a BeeClear device.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Performs one request/response cycle.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on connection failure, name resolution failure
    /// or timeout.
    async fn exchange(&self, request: &ExchangeRequest) -> Result<Exchange, ProtocolError>;

    /// Resolves a hostname on the local network.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the name does not resolve.
    async fn lookup(&self, hostname: &str) -> Result<IpAddr, ProtocolError>;
}

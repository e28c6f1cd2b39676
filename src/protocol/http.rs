// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP(S) transport backed by `reqwest`.

use std::error::Error as _;
use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use tokio::sync::OnceCell;

use crate::error::ProtocolError;
use crate::protocol::{Exchange, ExchangeRequest, Transport};

/// HTTP transport for communicating with BeeClear devices.
///
/// Plain HTTP requests go through a client created up front. The HTTPS client
/// is created on the first TLS request and reused afterwards, so its
/// connections are kept alive across a session. It does not validate
/// certificates, as BeeClear devices serve a self-signed one.
///
/// Redirects are never followed.
///
/// # Examples
///
/// ```no_run
/// use beeclear::protocol::{ExchangeRequest, HttpTransport, Transport};
///
/// # async fn example() -> Result<(), beeclear::ProtocolError> {
/// let transport = HttpTransport::new()?;
/// let request = ExchangeRequest::get("192.168.1.20", 80, "/bc_status");
/// let exchange = transport.exchange(&request).await?;
/// println!("{}: {}", exchange.status(), exchange.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    tls_client: OnceCell<Client>,
}

impl HttpTransport {
    /// Creates a new transport.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ProtocolError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            client,
            tls_client: OnceCell::new(),
        })
    }

    /// Returns whether the HTTPS client has been created yet.
    #[must_use]
    pub fn has_tls_client(&self) -> bool {
        self.tls_client.initialized()
    }

    async fn tls_client(&self) -> Result<&Client, ProtocolError> {
        self.tls_client
            .get_or_try_init(|| async {
                tracing::debug!("Creating HTTPS client without certificate validation");
                Client::builder()
                    .redirect(Policy::none())
                    .danger_accept_invalid_certs(true)
                    .build()
                    .map_err(ProtocolError::Http)
            })
            .await
    }
}

impl Transport for HttpTransport {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<Exchange, ProtocolError> {
        let client = if request.tls {
            self.tls_client().await?
        } else {
            &self.client
        };

        tracing::debug!(
            host = %request.host,
            port = request.port,
            path = %request.log_path(),
            tls = request.tls,
            "Sending HTTP request"
        );

        let response = client
            .request(request.method.clone(), request.url())
            .headers(request.headers.clone())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|err| classify(err, request.timeout))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|err| classify(err, request.timeout))?;

        tracing::debug!(status, body = %body, "Received HTTP response");

        Ok(Exchange::new(status, headers, body))
    }

    async fn lookup(&self, hostname: &str) -> Result<IpAddr, ProtocolError> {
        let mut addresses = tokio::net::lookup_host((hostname, 0))
            .await
            .map_err(|err| ProtocolError::ConnectionFailed(format!("{hostname}: {err}")))?;

        addresses
            .next()
            .map(|address| address.ip())
            .ok_or_else(|| ProtocolError::InvalidAddress(format!("{hostname} did not resolve")))
    }
}

/// Maps a `reqwest` failure onto the protocol error kinds.
fn classify(err: reqwest::Error, timeout: Duration) -> ProtocolError {
    if err.is_timeout() {
        ProtocolError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    } else if err.is_connect() {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ProtocolError::ConnectionFailed(message)
    } else {
        ProtocolError::Http(err)
    }
}

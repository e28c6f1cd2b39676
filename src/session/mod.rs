// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated sessions with a BeeClear device.
//!
//! A [`Session`] owns the connection parameters, the session cookie and the
//! login state. Every device call goes through one request path that attaches
//! the cookie, picks up refreshed cookies and validates status, content type
//! and JSON.
//!
//! Methods that talk to the device take `&mut self`: each request may replace
//! the cookie, so a session cannot be shared between concurrent calls. Use one
//! session per task, or serialize access yourself.
//!
//! ```no_run
//! use beeclear::{Session, SessionConfig, SessionOptions};
//!
//! # async fn example() -> beeclear::Result<()> {
//! let mut session = Session::new(SessionConfig::new().with_host("192.168.1.20"))?;
//! session.login(SessionOptions::new()).await?;
//!
//! let status = session.status().await?;
//! let readings = session.short_meter_readings().await?;
//! println!("{status} {readings:?}");
//!
//! session.logout().await?;
//! # Ok(())
//! # }
//! ```

mod discovery;
#[cfg(test)]
mod testing;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{
    CACHE_CONTROL, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue,
    USER_AGENT,
};
use serde_json::Value;

use crate::config::{DiscoveryConfig, SessionConfig, SessionOptions};
use crate::error::{Error, ParseError, ProtocolError, Result};
use crate::protocol::{ExchangeRequest, HttpTransport, Transport};
use crate::response::{MeterReadings, NetworkInfo, ShortReadings, strip_setting};

const LOGIN_PATH: &str = "/bc_login";
const LOGOUT_PATH: &str = "/bc_logout";
const REBOOT_PATH: &str = "/bc_reboot";
const READINGS_PATH: &str = "/bc_current";
const NETWORK_PATH: &str = "/bc_getNetwork";
const STATUS_PATH: &str = "/bc_status";
const SOFTWARE_VERSION_PATH: &str = "/bc_softwareVersion";
const FIRMWARE_LIST_PATH: &str = "/bc_firmware?type=list";

const USER_AGENT_VALUE: &str = concat!("beeclear-rs/", env!("CARGO_PKG_VERSION"));
const JSON_CONTENT_TYPE: &str = "text/json";

/// The most recent raw outcome of a device exchange, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastResponse {
    /// Body of the last response, recorded before validation.
    Body(String),
    /// Status code of the last response, when it was not 200.
    Status(u16),
    /// The transport error of the last failed exchange.
    Error(String),
}

/// A session with a BeeClear device.
///
/// The type parameter selects the transport; it defaults to
/// [`HttpTransport`].
#[derive(Debug)]
pub struct Session<T: Transport = HttpTransport> {
    config: SessionConfig,
    discovery: DiscoveryConfig,
    transport: T,
    cookie: Option<String>,
    logged_in: bool,
    last_response: Option<LastResponse>,
}

impl Session<HttpTransport> {
    /// Creates a session over HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> Session<T> {
    /// Creates a session over a custom transport.
    #[must_use]
    pub fn with_transport(config: SessionConfig, transport: T) -> Self {
        Self {
            config,
            discovery: DiscoveryConfig::default(),
            transport,
            cookie: None,
            logged_in: false,
            last_response: None,
        }
    }

    /// Replaces the discovery configuration.
    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Returns the connection parameters.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the discovery configuration.
    #[must_use]
    pub fn discovery_config(&self) -> &DiscoveryConfig {
        &self.discovery
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns whether the last login succeeded and no logout followed.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Returns the cookie sent with each request, if the device issued one.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Returns the outcome of the most recent exchange.
    #[must_use]
    pub fn last_response(&self) -> Option<&LastResponse> {
        self.last_response.as_ref()
    }

    // ========== Session lifecycle ==========

    /// Logs in to the device.
    ///
    /// `options` override the session's connection parameters first. If the
    /// host is still the generic `beeclear.local`, the device is discovered
    /// before logging in. Returns the device's login response without its
    /// `setting` member.
    ///
    /// # Errors
    ///
    /// Returns error if the login request fails. The session is then marked
    /// as logged out.
    pub async fn login(&mut self, options: SessionOptions) -> Result<Value> {
        self.config.apply(&options);

        match self.try_login().await {
            Ok(response) => {
                self.logged_in = true;
                tracing::debug!(host = %self.config.host(), "Logged in");
                Ok(response)
            }
            Err(err) => {
                self.logged_in = false;
                Err(err)
            }
        }
    }

    async fn try_login(&mut self) -> Result<Value> {
        if self.config.needs_discovery() {
            self.discover().await;
        }

        let path = login_path(self.config.username(), self.config.password());
        let mut response = self.request_with(&path, true, None).await?;
        strip_setting(&mut response);
        Ok(response)
    }

    /// Ends the session on the device and forgets the cookie.
    ///
    /// # Errors
    ///
    /// Returns error if not logged in or the request fails.
    pub async fn logout(&mut self) -> Result<()> {
        self.request(LOGOUT_PATH).await?;
        self.end_session();
        Ok(())
    }

    /// Reboots the device and forgets the cookie.
    ///
    /// # Errors
    ///
    /// Returns error if not logged in or the request fails.
    pub async fn reboot(&mut self) -> Result<()> {
        self.request(REBOOT_PATH).await?;
        self.end_session();
        Ok(())
    }

    fn end_session(&mut self) {
        self.logged_in = false;
        self.cookie = None;
    }

    // ========== Device information ==========

    /// Returns the settings of the wired and wireless interfaces.
    ///
    /// # Errors
    ///
    /// Returns error if either request fails.
    pub async fn network(&mut self) -> Result<NetworkInfo> {
        let eth = self.request(&format!("{NETWORK_PATH}?type=eth")).await?;
        let wifi = self.request(&format!("{NETWORK_PATH}?type=wifi")).await?;
        Ok(NetworkInfo { eth, wifi })
    }

    /// Returns device information: meter type, serials, firmware, uptime and settings.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn device_info(&mut self) -> Result<Value> {
        self.request(SOFTWARE_VERSION_PATH).await
    }

    /// Returns the P1 connection and SD card status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn status(&mut self) -> Result<Value> {
        self.request(STATUS_PATH).await
    }

    /// Returns the installed and downloadable firmware versions.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn firmware_list(&mut self) -> Result<Value> {
        let mut list = self.request(FIRMWARE_LIST_PATH).await?;
        strip_setting(&mut list);
        Ok(list)
    }

    // ========== Meter readings ==========

    /// Returns the power and gas meter readings, in short form if `short` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeterNotConnected`] if the device answers with
    /// something that is not JSON, which it does when no smart meter is
    /// plugged into its P1 port. Returns [`ParseError::MeterReadings`] if a
    /// short reading has neither power nor gas data.
    pub async fn meter_readings(&mut self, short: bool) -> Result<MeterReadings> {
        let raw = self.raw_meter_readings().await?;
        if !short {
            return Ok(MeterReadings::Full(raw));
        }
        Ok(MeterReadings::Short(ShortReadings::from_raw(&raw)?))
    }

    /// Returns the raw meter readings payload.
    ///
    /// # Errors
    ///
    /// See [`meter_readings`](Self::meter_readings).
    pub async fn full_meter_readings(&mut self) -> Result<Value> {
        self.raw_meter_readings().await
    }

    /// Returns the short-form meter readings.
    ///
    /// # Errors
    ///
    /// See [`meter_readings`](Self::meter_readings).
    pub async fn short_meter_readings(&mut self) -> Result<ShortReadings> {
        let raw = self.raw_meter_readings().await?;
        Ok(ShortReadings::from_raw(&raw)?)
    }

    async fn raw_meter_readings(&mut self) -> Result<Value> {
        self.request(READINGS_PATH).await.map_err(|err| {
            if err.is_malformed_json() {
                Error::MeterNotConnected
            } else {
                err
            }
        })
    }

    // ========== Requests ==========

    /// Sends an authenticated `GET` for `path` and decodes the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without touching the network if there is
    /// no active login. Otherwise fails on transport errors, non-200 status,
    /// a content type other than `text/json`, or invalid JSON.
    pub async fn request(&mut self, path: &str) -> Result<Value> {
        self.request_with(path, false, None).await
    }

    /// Like [`request`](Self::request), with a one-off timeout.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn request_with_timeout(&mut self, path: &str, timeout: Duration) -> Result<Value> {
        self.request_with(path, false, Some(timeout)).await
    }

    /// The single path every device call goes through.
    ///
    /// `force` bypasses the login check, which the login request itself needs.
    pub(crate) async fn request_with(
        &mut self,
        path: &str,
        force: bool,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        if !self.logged_in && !force {
            return Err(Error::NotLoggedIn);
        }

        let request = ExchangeRequest::get(self.config.host(), self.config.port(), path)
            .with_tls(self.config.use_tls())
            .with_timeout(timeout.unwrap_or(self.config.timeout()))
            .with_headers(self.request_headers()?);

        let exchange = match self.transport.exchange(&request).await {
            Ok(exchange) => exchange,
            Err(err) => {
                self.last_response = Some(LastResponse::Error(err.to_string()));
                return Err(err.into());
            }
        };

        self.last_response = Some(LastResponse::Body(exchange.body().to_string()));

        if let Some(cookie) = exchange.cookie() {
            self.cookie = Some(cookie);
        }

        let status = exchange.status();
        if status != 200 {
            tracing::warn!(status, path = %request.log_path(), "Device rejected request");
            self.last_response = Some(LastResponse::Status(status));
            return Err(Error::Status(status));
        }

        let content_type = exchange.header(CONTENT_TYPE).unwrap_or("none");
        if !content_type.starts_with(JSON_CONTENT_TYPE) {
            return Err(Error::ContentType(content_type.to_string()));
        }

        let value = serde_json::from_str(exchange.body()).map_err(ParseError::Json)?;
        Ok(value)
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));

        if let Some(cookie) = &self.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| ProtocolError::InvalidHeader(err.to_string()))?;
            headers.insert(COOKIE, value);
        }

        Ok(headers)
    }
}

/// Builds the login path. The device expects both credentials base64-encoded.
fn login_path(username: &str, password: &str) -> String {
    let username = BASE64.encode(username);
    let password = BASE64.encode(password);
    format!(
        "{LOGIN_PATH}?username={}&password={}",
        urlencoding::encode(&username),
        urlencoding::encode(&password)
    )
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session and discovery configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Connection parameters of a BeeClear session.
///
/// # Examples
///
/// ```
/// use beeclear::SessionConfig;
/// use std::time::Duration;
///
/// // Factory defaults: beeclear.local:80, user "beeclear"
/// let config = SessionConfig::new();
///
/// // With all options
/// let config = SessionConfig::new()
///     .with_host("192.168.1.20")
///     .with_port(443)
///     .with_credentials("beeclear", "secret")
///     .with_timeout(Duration::from_secs(5));
/// assert!(config.use_tls());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    host: String,
    port: u16,
    use_tls: bool,
    timeout: Duration,
    username: String,
    password: String,
}

impl SessionConfig {
    /// Hostname the device announces on the local network.
    pub const DEFAULT_HOST: &'static str = "beeclear.local";
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port. Selecting it turns TLS on.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);
    /// Factory username.
    pub const DEFAULT_USERNAME: &'static str = "beeclear";
    /// Factory password.
    pub const DEFAULT_PASSWORD: &'static str = "energie";

    /// Creates a configuration with the device's factory defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            use_tls: false,
            timeout: Self::DEFAULT_TIMEOUT,
            username: Self::DEFAULT_USERNAME.to_string(),
            password: Self::DEFAULT_PASSWORD.to_string(),
        }
    }

    /// Sets the hostname or IP address of the device.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets a custom port.
    ///
    /// Port 443 implies TLS.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        if port == Self::DEFAULT_HTTPS_PORT {
            self.use_tls = true;
        }
        self
    }

    /// Enables or disables TLS. TLS stays on while the port is 443.
    #[must_use]
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls || self.port == Self::DEFAULT_HTTPS_PORT;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether requests use HTTPS.
    #[must_use]
    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns whether the host still has to be discovered.
    #[must_use]
    pub fn needs_discovery(&self) -> bool {
        self.host.is_empty() || self.host == Self::DEFAULT_HOST
    }

    pub(crate) fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// Applies login-time overrides. Unset, empty and zero values are ignored.
    pub(crate) fn apply(&mut self, options: &SessionOptions) {
        if let Some(host) = non_empty(options.host.as_deref()) {
            self.host = host.to_string();
        }
        if let Some(port) = options.port.filter(|port| *port != 0) {
            self.port = port;
            if port == Self::DEFAULT_HTTPS_PORT {
                self.use_tls = true;
            }
        }
        if let Some(use_tls) = options.use_tls {
            self.use_tls = use_tls || self.port == Self::DEFAULT_HTTPS_PORT;
        }
        if let Some(timeout) = options.timeout.filter(|ms| *ms != 0) {
            self.timeout = Duration::from_millis(timeout);
        }
        if let Some(username) = non_empty(options.username.as_deref()) {
            self.username = username.to_string();
        }
        if let Some(password) = non_empty(options.password.as_deref()) {
            self.password = password.to_string();
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("timeout", &self.timeout)
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Overrides applied to a session when logging in.
///
/// Every field is optional; whatever is set replaces the session's current
/// value. Deserializes from the same keys the device tooling uses
/// (`host`, `port`, `useTLS`, `timeout` in milliseconds, `username`,
/// `password`).
///
/// # Examples
///
/// ```
/// use beeclear::SessionOptions;
///
/// let options = SessionOptions::new()
///     .with_host("192.168.1.20")
///     .with_password("secret");
///
/// let from_json: SessionOptions =
///     serde_json::from_str(r#"{"host": "10.0.0.22", "useTLS": true, "timeout": 5000}"#).unwrap();
/// assert_eq!(from_json.timeout, Some(5000));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Hostname or IP address of the device.
    pub host: Option<String>,
    /// TCP port.
    pub port: Option<u16>,
    /// Force HTTPS.
    #[serde(rename = "useTLS", alias = "use_tls")]
    pub use_tls: Option<bool>,
    /// Request timeout in milliseconds.
    pub timeout: Option<u64>,
    /// Login username.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
}

impl SessionOptions {
    /// Creates an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Overrides the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Overrides the TLS flag.
    #[must_use]
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = Some(use_tls);
        self
    }

    /// Overrides the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Overrides the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Overrides the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("timeout", &self.timeout)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "*****"))
            .finish()
    }
}

/// Where discovery looks for a device.
///
/// The local lookup resolves the device's mDNS name; the online lookup asks
/// the vendor's "mijnmeter" page, which redirects to the address the device
/// last published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    local_hostname: Option<String>,
    endpoint_host: String,
    endpoint_port: u16,
    endpoint_path: String,
}

impl DiscoveryConfig {
    /// Default online discovery host.
    pub const DEFAULT_ENDPOINT_HOST: &'static str = "beeclear.nl";
    /// Default online discovery path.
    pub const DEFAULT_ENDPOINT_PATH: &'static str = "/mijnmeter/";

    /// Creates the default discovery configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_hostname: Some(SessionConfig::DEFAULT_HOST.to_string()),
            endpoint_host: Self::DEFAULT_ENDPOINT_HOST.to_string(),
            endpoint_port: SessionConfig::DEFAULT_PORT,
            endpoint_path: Self::DEFAULT_ENDPOINT_PATH.to_string(),
        }
    }

    /// Sets the hostname resolved by the local lookup.
    #[must_use]
    pub fn with_local_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.local_hostname = Some(hostname.into());
        self
    }

    /// Skips the local lookup and goes straight to the online endpoint.
    #[must_use]
    pub fn without_local_lookup(mut self) -> Self {
        self.local_hostname = None;
        self
    }

    /// Sets the online discovery endpoint (always queried over plain HTTP).
    #[must_use]
    pub fn with_endpoint(
        mut self,
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
    ) -> Self {
        self.endpoint_host = host.into();
        self.endpoint_port = port;
        self.endpoint_path = path.into();
        self
    }

    /// Returns the hostname resolved by the local lookup, if enabled.
    #[must_use]
    pub fn local_hostname(&self) -> Option<&str> {
        self.local_hostname.as_deref()
    }

    /// Returns the online endpoint's host.
    #[must_use]
    pub fn endpoint_host(&self) -> &str {
        &self.endpoint_host
    }

    /// Returns the online endpoint's port.
    #[must_use]
    pub fn endpoint_port(&self) -> u16 {
        self.endpoint_port
    }

    /// Returns the online endpoint's path.
    #[must_use]
    pub fn endpoint_path(&self) -> &str {
        &self.endpoint_path
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Finding a BeeClear device on the local network.
//!
//! Discovery first resolves the device's mDNS name. If that fails it asks the
//! vendor's "mijnmeter" page, which answers with a small script redirecting to
//! the address the device last published:
//!
//! ```text
//! <script language="javascript"> window.location.href = "http://10.0.0.22" </script>
//! ```
//!
//! Discovery is best effort. Nothing it does is fatal; when no address is
//! found the session keeps its current host.

use std::sync::LazyLock;

use regex::Regex;

use crate::protocol::{ExchangeRequest, Transport};
use crate::session::{LastResponse, Session};

const REDIRECT_MARKER: &str = "window.location.href";

static REDIRECT_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""http://([^"/]*)/?""#).expect("redirect pattern is valid"));

impl<T: Transport> Session<T> {
    /// Looks for the device and updates the session's host if it is found.
    ///
    /// Returns the session's host afterwards, which is unchanged when neither
    /// the local nor the online lookup produced an address.
    pub async fn discover(&mut self) -> String {
        let address = match self.lookup_local().await {
            Some(address) => Some(address),
            None => self.lookup_online().await,
        };

        match address {
            Some(address) => {
                tracing::debug!(address = %address, "Discovered BeeClear device");
                self.config.set_host(address);
            }
            None => {
                tracing::debug!(host = %self.config.host(), "No BeeClear device discovered");
            }
        }

        self.config.host().to_string()
    }

    async fn lookup_local(&self) -> Option<String> {
        let hostname = self.discovery.local_hostname()?;
        match self.transport.lookup(hostname).await {
            Ok(address) => Some(address.to_string()),
            Err(err) => {
                tracing::debug!(hostname, error = %err, "Local lookup failed");
                None
            }
        }
    }

    async fn lookup_online(&mut self) -> Option<String> {
        let request = ExchangeRequest::get(
            self.discovery.endpoint_host(),
            self.discovery.endpoint_port(),
            self.discovery.endpoint_path(),
        )
        .with_timeout(self.config.timeout());

        let exchange = match self.transport.exchange(&request).await {
            Ok(exchange) => exchange,
            Err(err) => {
                tracing::debug!(error = %err, "Online discovery failed");
                self.last_response = Some(LastResponse::Error(err.to_string()));
                return None;
            }
        };

        if exchange.status() != 200 {
            tracing::debug!(status = exchange.status(), "Online discovery failed");
            return None;
        }

        redirect_host(exchange.body())
    }
}

/// Extracts the host from the discovery page's redirect script.
fn redirect_host(body: &str) -> Option<String> {
    if !body.contains(REDIRECT_MARKER) {
        return None;
    }

    REDIRECT_HOST
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|host| host.as_str().to_string())
        .filter(|host| !host.is_empty())
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a real BeeClear device.
//!
//! These tests require a device on the network and are ignored by default.
//! Run with: `cargo test --test real_devices -- --ignored --test-threads=1`
//!
//! # Environment Variables
//!
//! - `BEECLEAR_HOST` - Device IP address (discovered when unset)
//! - `BEECLEAR_PORT` - Device port (default: 80; 443 uses HTTPS)
//! - `BEECLEAR_USER` - Username (default: `beeclear`)
//! - `BEECLEAR_PASSWORD` - Password (default: `energie`)
//!
//! # Example
//!
//! ```bash
//! export BEECLEAR_HOST=192.168.1.20
//! export BEECLEAR_PASSWORD=secret
//! cargo test --test real_devices -- --ignored --test-threads=1
//! ```

use std::env;

use beeclear::{Error, Session, SessionConfig, SessionOptions};

fn options_from_env() -> SessionOptions {
    let mut options = SessionOptions::new();
    options.host = env::var("BEECLEAR_HOST").ok();
    options.port = env::var("BEECLEAR_PORT")
        .ok()
        .map(|port| port.parse().expect("Invalid BEECLEAR_PORT"));
    options.username = env::var("BEECLEAR_USER").ok();
    options.password = env::var("BEECLEAR_PASSWORD").ok();
    options
}

async fn login() -> Session {
    let mut session = Session::new(SessionConfig::new()).expect("client creation failed");
    session
        .login(options_from_env())
        .await
        .expect("login failed");
    session
}

#[tokio::test]
#[ignore = "requires a BeeClear device"]
async fn login_and_logout() {
    let mut session = login().await;
    assert!(session.is_logged_in());

    session.logout().await.unwrap();
    assert!(!session.is_logged_in());
}

#[tokio::test]
#[ignore = "requires a BeeClear device"]
async fn device_information() {
    let mut session = login().await;

    let info = session.device_info().await.unwrap();
    assert_eq!(info["info"], "ok");

    let status = session.status().await.unwrap();
    assert!(status.get("p1").is_some());

    let network = session.network().await.unwrap();
    assert_eq!(network.eth["status"], "ok");

    session.logout().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a BeeClear device"]
async fn meter_readings() {
    let mut session = login().await;

    match session.short_meter_readings().await {
        Ok(readings) => {
            assert!(readings.measured_at().is_some() || readings.gas_measured_at().is_some());
        }
        Err(Error::MeterNotConnected) => eprintln!("no smart meter on the P1 port"),
        Err(err) => panic!("reading failed: {err}"),
    }

    session.logout().await.unwrap();
}

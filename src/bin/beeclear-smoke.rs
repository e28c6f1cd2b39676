// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smoke test against a real BeeClear device.
//!
//! Runs every operation once, in order, and prints the results.
//!
//! # Usage
//!
//! ```bash
//! cargo run --features cli --bin beeclear-smoke -- [key=value ...]
//! ```
//!
//! Recognized keys: `host`, `port`, `useTLS`, `timeout` (ms), `username`,
//! `password`, `short`.
//!
//! # Example
//!
//! ```bash
//! cargo run --features cli --bin beeclear-smoke -- password=energie
//! cargo run --features cli --bin beeclear-smoke -- host=192.168.1.20 port=443 short=true
//! ```

use std::env;
use std::fmt::Display;
use std::time::Instant;

use beeclear::{Session, SessionConfig, SessionOptions};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (options, short) = parse_args(env::args().skip(1));

    println!("========== STARTING TEST ==========");
    println!("beeclear version: {}", env!("CARGO_PKG_VERSION"));
    println!("OS: {} {}", env::consts::OS, env::consts::ARCH);

    let mut session = Session::new(SessionConfig::new())?;
    let mut run = Run::new();

    println!("trying to discover BeeClear...");
    let host = session.discover().await;
    println!("Local address: {host}");
    run.tick();

    // Every other call needs a session.
    println!("trying to login:");
    let result = session.login(options).await;
    let logged_in = result.is_ok();
    run.report(result);
    if !logged_in {
        println!("test aborted: login failed");
        return Ok(());
    }

    println!("trying to get device information and settings:");
    let result = session.device_info().await;
    run.report(result);

    println!("trying to get device status:");
    let result = session.status().await;
    run.report(result);

    println!("trying to get network interface status:");
    let result = session.network().await;
    run.report(result);

    println!("trying to get meter readings:");
    let result = session.meter_readings(short).await;
    run.report(result);

    println!("trying to get online firmware list:");
    let result = session.firmware_list().await;
    run.report(result);

    println!("trying to logout:");
    let result = session.logout().await.map(|()| true);
    run.report(result);

    println!("{:#?}", session.config());
    if run.errors > 0 {
        println!("test finished with {} errors", run.errors);
    } else {
        println!("test finished without errors :)");
    }

    Ok(())
}

struct Run {
    started: Instant,
    errors: usize,
}

impl Run {
    fn new() -> Self {
        println!("t = 0");
        Self {
            started: Instant::now(),
            errors: 0,
        }
    }

    fn report<T: Serialize, E: Display>(&mut self, result: Result<T, E>) {
        match result {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("error: {err}"),
            },
            Err(err) => {
                println!("error: {err}");
                self.errors += 1;
            }
        }
        self.tick();
    }

    fn tick(&self) {
        println!("t = {:.3}", self.started.elapsed().as_secs_f64());
    }
}

/// Parses `key=value` arguments into session overrides and the `short` flag.
///
/// Malformed pairs and unknown keys are ignored; quotes around values are
/// stripped.
fn parse_args(args: impl IntoIterator<Item = String>) -> (SessionOptions, bool) {
    let mut options = SessionOptions::new();
    let mut short = false;

    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            continue;
        };
        let value = value.trim_start_matches('=').replace(['\'', '"'], "");

        match key {
            "host" => options.host = Some(value),
            "port" => options.port = value.parse().ok(),
            "useTLS" => options.use_tls = Some(value.eq_ignore_ascii_case("true")),
            "timeout" => options.timeout = value.parse().ok(),
            "username" => options.username = Some(value),
            "password" => options.password = Some(value),
            "short" => short = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    (options, short)
}

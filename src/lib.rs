// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `beeclear` - A Rust library to query BeeClear energy monitors.
//!
//! The BeeClear reads a Dutch or Belgian smart meter through its P1 port and
//! exposes the readings over a local HTTP(S) API. This library discovers the
//! device, logs in, keeps the session cookie and returns the device's JSON.
//!
//! # Supported Features
//!
//! - **Discovery**: local `beeclear.local` lookup with fallback to the vendor's
//!   online redirect page
//! - **Session**: login, logout and reboot with cookie handling
//! - **Readings**: power and gas meter readings, raw or in short form
//! - **Device information**: network interfaces, P1 and SD card status,
//!   firmware versions
//!
//! # Quick Start
//!
//! ```no_run
//! use beeclear::{Session, SessionConfig, SessionOptions};
//!
//! #[tokio::main]
//! async fn main() -> beeclear::Result<()> {
//!     // Factory defaults; the device is discovered on login
//!     let mut session = Session::new(SessionConfig::new())?;
//!     session.login(SessionOptions::new()).await?;
//!
//!     let readings = session.short_meter_readings().await?;
//!     if let Some(power) = &readings.power {
//!         println!("Actual power: {} W", power.power);
//!     }
//!     if let Some(gas) = &readings.gas {
//!         println!("Gas meter: {} m³", gas.volume);
//!     }
//!
//!     session.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## HTTPS
//!
//! ```no_run
//! use beeclear::{Session, SessionConfig, SessionOptions};
//!
//! # async fn example() -> beeclear::Result<()> {
//! // Port 443 turns TLS on. The device's self-signed certificate is accepted.
//! let config = SessionConfig::new()
//!     .with_host("192.168.1.20")
//!     .with_port(443)
//!     .with_credentials("beeclear", "secret");
//!
//! let mut session = Session::new(config)?;
//! session.login(SessionOptions::new()).await?;
//! let network = session.network().await?;
//! println!("{}", network.eth);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod response;
mod session;

pub use config::{DiscoveryConfig, SessionConfig, SessionOptions};
pub use error::{Error, ParseError, ProtocolError, Result};
pub use protocol::{Exchange, ExchangeRequest, HttpTransport, Transport};
pub use response::{GasSummary, MeterReadings, NetworkInfo, PowerSummary, ShortReadings};
pub use session::{LastResponse, Session};

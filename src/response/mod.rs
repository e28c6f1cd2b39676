// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for BeeClear JSON responses.
//!
//! Most endpoints return device-defined JSON that is passed through as
//! [`serde_json::Value`]. Meter readings additionally have a typed short form.

mod readings;

pub use readings::{GasSummary, MeterReadings, PowerSummary, ShortReadings};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Network information for both interfaces of the device.
///
/// Each member is the device's answer for that interface (IP settings, link
/// state, MAC address and, for Wi-Fi, mode and SSID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Wired interface.
    pub eth: Value,
    /// Wireless interface.
    pub wifi: Value,
}

/// Removes the `setting` member the device attaches to some responses.
pub(crate) fn strip_setting(value: &mut Value) {
    if let Value::Object(map) = value {
        map.remove("setting");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strip_setting_removes_member() {
        let mut value = json!({ "info": "ok", "setting": { "user": "beeclear" } });
        strip_setting(&mut value);
        assert_eq!(value, json!({ "info": "ok" }));
    }

    #[test]
    fn strip_setting_ignores_non_objects() {
        let mut value = json!([1, 2, 3]);
        strip_setting(&mut value);
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn network_info_serializes_by_interface() {
        let info = NetworkInfo {
            eth: json!({ "status": "ok", "proto": "dhcp" }),
            wifi: json!({ "status": "ok", "mode": "ap" }),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["eth"]["proto"], "dhcp");
        assert_eq!(value["wifi"]["mode"], "ap");
    }
}

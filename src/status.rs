// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Status extraction for listed custom resources.
//!
//! Two independent readings of an object's `status`:
//! - readiness, from the first record of `status.conditions`
//! - connection details, from `status.share.ips`
//!
//! Missing or mistyped fields never fail; they map to fixed messages.

use serde_json::Value;
use tracing::debug;

use crate::kubernetes::RawObject;

pub const MSG_READY: &str = "Ready";
pub const MSG_NOT_READY: &str = "Not Ready";
pub const MSG_NO_CONDITIONS: &str = "No conditions found";

pub const NO_SHARE_FOUND: &str = "NO STATUS FOUND";
pub const NO_IPS_FOUND: &str = "NO IPS FOUND IN STATUS";

const CONDITIONS_PATH: &[&str] = &["status", "conditions"];
const SHARE_PATH: &[&str] = &["status", "share"];

/// Derive `(status message, ready)` from `status.conditions`.
///
/// Only the first condition record is examined: the object is ready when that
/// record is `{type: "Ready", status: "True"}`. A `Ready` record at any later
/// position does not count.
pub fn extract_readiness(obj: &RawObject) -> (String, bool) {
    let Some(conditions) = obj.get_slice(CONDITIONS_PATH) else {
        return (MSG_NO_CONDITIONS.to_string(), false);
    };

    // Entries that are not records are skipped when looking for the first one
    let first = conditions.iter().find_map(Value::as_object);

    match first {
        Some(condition)
            if condition.get("type").and_then(Value::as_str) == Some("Ready")
                && condition.get("status").and_then(Value::as_str) == Some("True") =>
        {
            (MSG_READY.to_string(), true)
        }
        _ => (MSG_NOT_READY.to_string(), false),
    }
}

/// Read the assigned addresses from `status.share.ips`.
///
/// The value is returned as-is; it may hold several comma-separated addresses.
pub fn extract_connection_details(obj: &RawObject) -> String {
    let Some(share) = obj.get_map(SHARE_PATH) else {
        debug!(name = %obj.name(), "No share information in status");
        return NO_SHARE_FOUND.to_string();
    };

    match share.get("ips").and_then(Value::as_str) {
        Some(ips) => {
            debug!(name = %obj.name(), ips = %ips, "Found IPs in share status");
            ips.to_string()
        }
        None => {
            debug!(name = %obj.name(), "No IPs in share status");
            NO_IPS_FOUND.to_string()
        }
    }
}

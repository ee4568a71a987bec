// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use serde::{Deserialize, Serialize};

/// Error returned to RPC callers. There is no partial-success shape: a request
/// either yields the complete list or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceError {
    /// Listing one of the requested kinds failed
    ListingFailed(String),
    /// The request deadline passed before the listing finished
    DeadlineExceeded,
}

impl<E> From<E> for ServiceError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err: anyhow::Error = err.into();
        Self::ListingFailed(format!("{err:#}"))
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::ListingFailed(reason) => write!(f, "error fetching resources: {reason}"),
            ServiceError::DeadlineExceeded => f.write_str("request deadline exceeded"),
        }
    }
}

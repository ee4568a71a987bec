// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! RPC surface of the resource service.
//!
//! A single unary call, `get_resources`, carried by tarpc with bincode framing
//! over a length-delimited byte stream (plain TCP or TLS).

pub mod client;
mod error;
pub mod tls;

use serde::{Deserialize, Serialize};
use tarpc::tokio_serde::formats::Bincode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

pub use error::ServiceError;

use crate::aggregator::ResourceSummary;

/// Default port the service listens on
pub const DEFAULT_PORT: u16 = 50051;

/// Request for a status listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Maximum number of resources across all kinds; zero or negative means all
    pub count: i32,
    /// Comma-separated kind names; empty or `*` selects the default kinds
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceListResponse {
    pub resources: Vec<ResourceSummary>,
}

#[tarpc::service]
pub trait ResourceService {
    /// List custom resources with their readiness and connection details
    async fn get_resources(request: ResourceRequest) -> Result<ResourceListResponse, ServiceError>;
}

/// Wrap a byte stream in the framing and codec both ends agree on
pub fn transport<S, Item, SinkItem>(
    io: S,
) -> tarpc::serde_transport::Transport<S, Item, SinkItem, Bincode<Item, SinkItem>>
where
    S: AsyncRead + AsyncWrite,
    Item: for<'de> Deserialize<'de>,
    SinkItem: Serialize,
{
    let framed = Framed::new(io, LengthDelimitedCodec::new());
    tarpc::serde_transport::new(framed, Bincode::default())
}

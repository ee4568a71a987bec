// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use futures::StreamExt;
use tarpc::context::Context as RpcContext;
use tarpc::server::{BaseChannel, Channel};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

use crate::aggregator::{Aggregator, ResourceQuery};
use crate::config::TransportSecurity;
use crate::rpc::{
    ResourceListResponse, ResourceRequest, ResourceService, ServiceError, tls, transport,
};

/// RPC server for the resource service
pub struct RpcServer {
    listener: TcpListener,
    acceptor: Option<TlsAcceptor>,
    handler: ResourceServer,
}

impl RpcServer {
    /// Bind the listener and prepare TLS. Any failure here is a startup error.
    pub async fn bind(
        addr: &str,
        security: &TransportSecurity,
        aggregator: Aggregator,
    ) -> Result<Self> {
        let acceptor = match security {
            TransportSecurity::Plaintext => None,
            TransportSecurity::Tls { cert, key } => Some(tls::acceptor(cert, key)?),
        };

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to listen on {}", addr))?;

        Ok(Self {
            listener,
            acceptor,
            handler: ResourceServer::new(aggregator),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let server_addr = self.local_addr()?;
        let secure = self.acceptor.is_some();

        info!(address = %server_addr, tls = secure, "RPC server listening");
        println!("maschinist listening on {} (tls: {})", server_addr, secure);

        tokio::pin!(shutdown);

        loop {
            let (socket, peer_addr) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down RPC server");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                },
            };

            debug!("New connection from {}", peer_addr);

            if let Err(e) = socket.set_nodelay(true) {
                debug!(peer = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }

            let handler = self.handler.clone();
            let acceptor = self.acceptor.clone();

            tokio::spawn(async move {
                match acceptor {
                    Some(acceptor) => match acceptor.accept(socket).await {
                        Ok(stream) => serve_connection(stream, handler).await,
                        Err(e) => error!("TLS handshake with {} failed: {}", peer_addr, e),
                    },
                    None => serve_connection(socket, handler).await,
                }
                debug!("Connection from {} closed", peer_addr);
            });
        }
    }
}

/// Serve RPC requests on one connection, each request on its own task
async fn serve_connection<S>(io: S, handler: ResourceServer)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    BaseChannel::with_defaults(transport(io))
        .execute(handler.serve())
        .for_each(|response| async move {
            tokio::spawn(response);
        })
        .await;
}

/// Request handler bridging RPC calls to the aggregator
#[derive(Clone)]
pub struct ResourceServer {
    aggregator: Arc<Aggregator>,
}

impl ResourceServer {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

impl ResourceService for ResourceServer {
    async fn get_resources(
        self,
        context: RpcContext,
        request: ResourceRequest,
    ) -> Result<ResourceListResponse, ServiceError> {
        debug!(count = request.count, kind = %request.kind, "GetResources");

        let query = ResourceQuery::new(request.count, request.kind);
        let remaining = context
            .deadline
            .duration_since(SystemTime::now())
            .unwrap_or_default();

        // Dropping the aggregation future cancels the in-flight cluster call
        let result = tokio::time::timeout(remaining, self.aggregator.get_resources(&query))
            .await
            .map_err(|_| {
                warn!(kind = %query.kind_filter, "Request deadline exceeded");
                ServiceError::DeadlineExceeded
            })?;

        match result {
            Ok(resources) => Ok(ResourceListResponse { resources }),
            Err(e) => {
                error!(kind = %query.kind_filter, error = %format!("{e:#}"), "GetResources failed");
                Err(ServiceError::from(e))
            }
        }
    }
}

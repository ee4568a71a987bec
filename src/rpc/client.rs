use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tarpc::{client, context};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::{ResourceListResponse, ResourceRequest, ResourceServiceClient, transport};

/// Client-side transport choice
#[derive(Debug, Clone)]
pub enum ClientSecurity<'a> {
    Plaintext,
    /// TLS, verifying against the CA bundle when one is given
    Tls { ca_cert: Option<&'a Path> },
}

impl<'a> ClientSecurity<'a> {
    pub fn new(secure: bool, ca_cert: Option<&'a Path>) -> Self {
        if secure {
            ClientSecurity::Tls { ca_cert }
        } else {
            ClientSecurity::Plaintext
        }
    }
}

/// Connect to a resource service at `addr` (`host:port`)
pub async fn connect(addr: &str, security: ClientSecurity<'_>) -> Result<ResourceServiceClient> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to {}", addr))?;
    stream.set_nodelay(true)?;

    let client = match security {
        ClientSecurity::Plaintext => {
            info!(server = %addr, "Using insecure connection");
            ResourceServiceClient::new(client::Config::default(), transport(stream)).spawn()
        }
        ClientSecurity::Tls { ca_cert } => {
            info!(server = %addr, "Using secure connection");
            let connector = super::tls::connector(ca_cert)?;
            let domain = super::tls::server_name(addr)?;
            let stream = connector
                .connect(domain, stream)
                .await
                .with_context(|| format!("TLS handshake with {} failed", addr))?;
            ResourceServiceClient::new(client::Config::default(), transport(stream)).spawn()
        }
    };

    debug!(server = %addr, "Connected");
    Ok(client)
}

/// Issue one `get_resources` call with a deadline
pub async fn get_resources(
    client: &ResourceServiceClient,
    request: ResourceRequest,
    timeout: Duration,
) -> Result<ResourceListResponse> {
    let mut ctx = context::current();
    ctx.deadline = SystemTime::now() + timeout;

    client
        .get_resources(ctx, request)
        .await
        .context("RPC call failed")?
        .map_err(|e| anyhow!("Error getting resources: {}", e))
}

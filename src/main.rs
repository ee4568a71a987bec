// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod aggregator;
mod cli;
pub mod config;
mod daemon;
mod kubernetes;
mod output;
mod rpc;
mod status;

use anyhow::{Result, anyhow};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::prelude::*;

use aggregator::Aggregator;
use cli::{Args, Command};
use config::Config;
use daemon::RpcServer;
use kubernetes::KubeLister;
use output::ResourceTable;
use rpc::ResourceRequest;
use rpc::client::ClientSecurity;

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool, to_stderr: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate daily or at 10MB, keep 5 files
    let log_path = log_dir.join("maschinist.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let (non_blocking, guard) = file_appender.get_non_blocking_appender();
    // Leak the guard to keep the background writer alive
    std::mem::forget(guard);

    let filter = if verbose {
        "maschinist=debug"
    } else {
        "maschinist=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if to_stderr {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let args = Args::parse();

    // The server always logs to stderr as well; the client only with -v
    let to_stderr = matches!(args.command, Command::Serve { .. }) || args.verbose;
    init_logging(args.verbose, to_stderr);

    match args.command {
        Command::Serve {
            config,
            listen,
            kubeconfig,
            context,
            secure_connection,
            tls_cert,
            tls_key,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if kubeconfig.is_some() {
                config.kubeconfig = kubeconfig;
            }
            if context.is_some() {
                config.context = context;
            }
            if tls_cert.is_some() {
                config.tls.cert = tls_cert;
            }
            if tls_key.is_some() {
                config.tls.key = tls_key;
            }

            run_server(config, secure_connection).await
        }
        Command::Get {
            server,
            secure_connection,
            ca_cert,
            count,
            kind,
            timeout,
            output,
            no_headers,
        } => {
            let client =
                rpc::client::connect(&server, ClientSecurity::new(secure_connection, ca_cert.as_deref()))
                    .await?;
            let response = rpc::client::get_resources(
                &client,
                ResourceRequest { count, kind },
                Duration::from_secs(timeout),
            )
            .await?;

            let table = ResourceTable::new(response.resources);
            println!("{}", table.format(&output, no_headers));
            Ok(())
        }
    }
}

/// Build everything the server needs up front, then serve until Ctrl-C
async fn run_server(config: Config, secure: bool) -> Result<()> {
    let security = config.transport_security(secure)?;
    let mapping = config.kind_mapping()?;

    let lister =
        KubeLister::connect(config.kubeconfig.as_deref(), config.context.as_deref()).await?;
    println!("Connected to cluster {}", lister.cluster());
    let aggregator = Aggregator::new(Arc::new(mapping), Arc::new(lister));
    info!(
        kinds = ?aggregator.kinds().kinds(),
        defaults = ?aggregator.kinds().default_kinds(),
        "Kind mapping loaded"
    );

    let server = RpcServer::bind(&config.listen, &security, aggregator).await?;
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

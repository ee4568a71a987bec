// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::parse_secure_connection;

#[derive(Parser, Debug)]
#[command(name = "maschinist")]
#[command(author, version, about = "Report readiness of Kubernetes custom resources over RPC")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

fn secure_connection(value: &str) -> Result<bool, String> {
    parse_secure_connection(value).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the RPC server
    Serve {
        /// Config file (default: ~/.maschinist/config.json)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Address to listen on (overrides config)
        #[arg(short, long, value_name = "ADDR")]
        listen: Option<String>,

        /// Kubeconfig file (overrides config)
        #[arg(long, value_name = "PATH")]
        kubeconfig: Option<PathBuf>,

        /// Kubeconfig context (overrides config)
        #[arg(short, long, value_name = "CONTEXT")]
        context: Option<String>,

        /// Serve over TLS ("true") or plaintext ("false")
        #[arg(long, env = "SECURE_CONNECTION", value_parser = secure_connection, action = ArgAction::Set, required = true)]
        secure_connection: bool,

        /// PEM certificate chain for TLS (overrides config)
        #[arg(long, value_name = "PATH", env = "TLS_CERT")]
        tls_cert: Option<PathBuf>,

        /// PEM private key for TLS (overrides config)
        #[arg(long, value_name = "PATH", env = "TLS_KEY")]
        tls_key: Option<PathBuf>,
    },

    /// Query a running server
    Get {
        /// Server address
        #[arg(short, long, env = "CLUSTERBOOK_SERVER", default_value = "localhost:50051")]
        server: String,

        /// Connect over TLS ("true") or plaintext ("false")
        #[arg(long, env = "SECURE_CONNECTION", value_parser = secure_connection, action = ArgAction::Set, required = true)]
        secure_connection: bool,

        /// CA bundle to verify the server certificate; unverified when omitted
        #[arg(long, value_name = "PATH")]
        ca_cert: Option<PathBuf>,

        /// Maximum number of resources across all kinds (0 = all)
        #[arg(short = 'n', long, default_value_t = 0, allow_negative_numbers = true)]
        count: i32,

        /// Comma-separated kinds; empty or "*" for the server's defaults
        #[arg(short, long, default_value = "*")]
        kind: String,

        /// Request timeout in seconds
        #[arg(short, long, default_value_t = 30)]
        timeout: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,

        /// Omit column headers in output
        #[arg(long)]
        no_headers: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_rejects_invalid_secure_connection() {
        let parsed = Args::try_parse_from(["maschinist", "serve", "--secure-connection", "maybe"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serve_args() {
        let args = Args::try_parse_from([
            "maschinist",
            "serve",
            "--secure-connection",
            "false",
            "--listen",
            "127.0.0.1:6000",
            "--context",
            "manager-dev",
        ])
        .unwrap();

        match args.command {
            Command::Serve {
                secure_connection,
                listen,
                context,
                ..
            } => {
                assert!(!secure_connection);
                assert_eq!(listen.as_deref(), Some("127.0.0.1:6000"));
                assert_eq!(context.as_deref(), Some("manager-dev"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_get_args() {
        let args = Args::try_parse_from([
            "maschinist",
            "-v",
            "get",
            "--secure-connection",
            "true",
            "--server",
            "clusterbook:50051",
            "-n",
            "5",
            "-k",
            "VsphereVMAnsible",
            "-o",
            "json",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Command::Get {
                server,
                secure_connection,
                count,
                kind,
                output,
                ..
            } => {
                assert_eq!(server, "clusterbook:50051");
                assert!(secure_connection);
                assert_eq!(count, 5);
                assert_eq!(kind, "VsphereVMAnsible");
                assert!(matches!(output, OutputFormat::Json));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_get_negative_count() {
        let args = Args::try_parse_from([
            "maschinist",
            "get",
            "--secure-connection",
            "false",
            "--count",
            "-1",
        ])
        .unwrap();
        match args.command {
            Command::Get { count, .. } => assert_eq!(count, -1),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

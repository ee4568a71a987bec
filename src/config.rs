// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration for maschinist
//!
//! Built once at startup and passed down explicitly; request handling never
//! reads the environment. All maschinist data is stored under ~/.maschinist/:
//! - ~/.maschinist/config.json - service configuration
//! - ~/.maschinist/log/ - log files

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::kubernetes::KindMapping;
use crate::kubernetes::kinds::{CollectionId, builtin_collections, builtin_default_kinds};
use crate::rpc::DEFAULT_PORT;

/// Get the base maschinist directory (~/.maschinist/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".maschinist"))
        .context("Could not determine home directory")
}

fn default_listen() -> String {
    format!("0.0.0.0:{}", DEFAULT_PORT)
}

/// PEM files for the TLS listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsFiles {
    #[serde(default)]
    pub cert: Option<PathBuf>,
    #[serde(default)]
    pub key: Option<PathBuf>,
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address the RPC listener binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Kubeconfig file; inferred when unset
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context; the kubeconfig's current context when unset
    #[serde(default)]
    pub context: Option<String>,

    /// Kind name -> collection table
    #[serde(default = "builtin_collections")]
    pub kinds: Vec<CollectionId>,

    /// Kinds queried for an empty or `*` filter, in order
    #[serde(default = "builtin_default_kinds")]
    pub default_kinds: Vec<String>,

    #[serde(default)]
    pub tls: TlsFiles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            kubeconfig: None,
            context: None,
            kinds: builtin_collections(),
            default_kinds: builtin_default_kinds(),
            tls: TlsFiles::default(),
        }
    }
}

impl Config {
    /// Load config from an explicit path (which must exist), or from the
    /// default location, falling back to built-in defaults if it is absent
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config file path (~/.maschinist/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Build the read-only kind table
    pub fn kind_mapping(&self) -> Result<KindMapping> {
        let mapping = KindMapping::new(self.kinds.clone(), self.default_kinds.clone())
            .context("Invalid kind mapping")?;

        for kind in &self.default_kinds {
            if mapping.resolve(kind).is_none() {
                tracing::warn!(kind = %kind, "Default kind has no mapping and will be skipped");
            }
        }

        Ok(mapping)
    }

    /// Resolve the transport security selection against the configured TLS files
    pub fn transport_security(&self, secure: bool) -> Result<TransportSecurity> {
        if !secure {
            return Ok(TransportSecurity::Plaintext);
        }
        match (&self.tls.cert, &self.tls.key) {
            (Some(cert), Some(key)) => Ok(TransportSecurity::Tls {
                cert: cert.clone(),
                key: key.clone(),
            }),
            (None, _) => bail!("Secure connection requested but no TLS certificate configured"),
            (_, None) => bail!("Secure connection requested but no TLS private key configured"),
        }
    }
}

/// Listener transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSecurity {
    Plaintext,
    Tls { cert: PathBuf, key: PathBuf },
}

/// Parse a `SECURE_CONNECTION` value; only `true` and `false` are accepted
pub fn parse_secure_connection(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(anyhow!(
            "Invalid SECURE_CONNECTION value: '{}'. Expected 'true' or 'false'",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.listen, "0.0.0.0:50051");
        assert_eq!(config.kinds.len(), 2);
        assert_eq!(config.default_kinds, vec!["AnsibleRun", "VsphereVMAnsible"]);
        assert!(config.kubeconfig.is_none());
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_kinds() {
        let json = r#"{
            "listen": "127.0.0.1:6000",
            "kinds": [
                {"kind": "Database", "group": "db.example.com", "version": "v1", "plural": "databases"}
            ],
            "default_kinds": ["Database"],
            "tls": {"cert": "/etc/tls/tls.crt", "key": "/etc/tls/tls.key"}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.listen, "127.0.0.1:6000");
        assert_eq!(config.kinds[0].plural, "databases");
        assert_eq!(config.tls.cert, Some(PathBuf::from("/etc/tls/tls.crt")));

        let mapping = config.kind_mapping().unwrap();
        assert!(mapping.resolve("Database").is_some());
        assert!(mapping.resolve("AnsibleRun").is_none());
        assert_eq!(mapping.expand_filter("*"), vec!["Database"]);
    }

    #[test]
    fn test_duplicate_kinds_fail() {
        let mut config = Config::default();
        config.kinds.push(config.kinds[0].clone());
        let err = config.kind_mapping().unwrap_err();
        assert!(format!("{err:#}").contains("mapped more than once"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let config = Config {
            context: Some("manager-dev".to_string()),
            ..Default::default()
        };
        fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{not json").unwrap();
        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_parse_secure_connection() {
        assert!(parse_secure_connection("true").unwrap());
        assert!(!parse_secure_connection("false").unwrap());
        assert!(parse_secure_connection("TRUE").is_err());
        assert!(parse_secure_connection("").is_err());
        assert!(parse_secure_connection("yes").is_err());
    }

    #[test]
    fn test_transport_security() {
        let mut config = Config::default();
        assert_eq!(
            config.transport_security(false).unwrap(),
            TransportSecurity::Plaintext
        );
        assert!(config.transport_security(true).is_err());

        config.tls.cert = Some(PathBuf::from("tls.crt"));
        let err = config.transport_security(true).unwrap_err();
        assert!(err.to_string().contains("private key"));

        config.tls.key = Some(PathBuf::from("tls.key"));
        assert_eq!(
            config.transport_security(true).unwrap(),
            TransportSecurity::Tls {
                cert: PathBuf::from("tls.crt"),
                key: PathBuf::from("tls.key"),
            }
        );
    }
}

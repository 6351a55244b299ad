// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Any error
//! here is fatal: the server refuses to start rather than run half
//! configured.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for zones, records and audit logs | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `FILE_ENCRYPTION_KEY` | 32-byte AES key, hex or base64 | Required |
//! | `AUTH_JWT_SECRET` | HS256 secret for bearer tokens | Unset = development mode |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | Optional |
//! | `MAX_UPLOAD_BYTES` | Largest accepted upload | `26214400` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files, both or neither | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::AuthConfig;
use crate::crypto::{CryptoError, EncryptionKey};
use crate::storage::paths::DATA_ROOT;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const FILE_ENCRYPTION_KEY_ENV: &str = "FILE_ENCRYPTION_KEY";
pub const AUTH_JWT_SECRET_ENV: &str = "AUTH_JWT_SECRET";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// 25 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FILE_ENCRYPTION_KEY is not set")]
    MissingEncryptionKey,

    #[error("FILE_ENCRYPTION_KEY is invalid: {0}")]
    InvalidEncryptionKey(#[source] CryptoError),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Everything the server needs to start.
#[derive(Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub encryption_key: EncryptionKey,
    pub auth: AuthConfig,
    pub max_upload_bytes: usize,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = get(DATA_DIR_ENV).unwrap_or_else(|| DATA_ROOT.to_string());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: PORT_ENV,
                    value,
                })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                name: HOST_ENV,
                value: host,
            })?;

        let encryption_key = get(FILE_ENCRYPTION_KEY_ENV)
            .ok_or(ConfigError::MissingEncryptionKey)
            .and_then(|raw| {
                EncryptionKey::parse(raw.trim()).map_err(ConfigError::InvalidEncryptionKey)
            })?;

        let max_upload_bytes = match get(MAX_UPLOAD_BYTES_ENV) {
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: MAX_UPLOAD_BYTES_ENV,
                        value,
                    })
                }
            },
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            data_dir: data_dir.into(),
            bind_addr,
            encryption_key,
            auth: AuthConfig {
                jwt_secret: get(AUTH_JWT_SECRET_ENV),
                issuer: get(AUTH_ISSUER_ENV),
            },
            max_upload_bytes,
            tls,
        })
    }
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

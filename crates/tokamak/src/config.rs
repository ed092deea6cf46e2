/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Application configuration: where to bind, and how large a request body to accept.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};

/// Where the application listens.
///
/// Parses either a `unix:`-prefixed filesystem path (`unix:/run/app.sock`) or one or more
/// comma-separated TCP socket addresses (`0.0.0.0:8080,[::]:8080`) - the same shorthand most
/// of our services accept on the command line, so config files and env vars can use it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAddress {
    /// One or more TCP addresses to listen on simultaneously.
    Tcp(Vec<SocketAddr>),
    /// A Unix domain socket path.
    #[cfg(unix)]
    Unix(std::path::PathBuf),
}

/// Error returned by [`BindAddress::from_str`] when the string is neither a valid `unix:`
/// path nor a comma-separated list of socket addresses.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid bind address {0:?}")]
pub struct ParseBindAddressError(String);

impl FromStr for BindAddress {
    type Err = ParseBindAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[cfg(unix)]
        if let Some(path) = s.strip_prefix("unix:") {
            return Ok(Self::Unix(std::path::PathBuf::from(path)));
        }

        let mut addrs = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            addrs.push(
                part.parse::<SocketAddr>()
                    .map_err(|_| ParseBindAddressError(s.to_owned()))?,
            );
        }

        if addrs.is_empty() {
            return Err(ParseBindAddressError(s.to_owned()));
        }

        Ok(Self::Tcp(addrs))
    }
}

impl fmt::Display for BindAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addrs) => {
                let rendered = addrs
                    .iter()
                    .map(SocketAddr::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&rendered)
            }
            #[cfg(unix)]
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

impl<'de> Deserialize<'de> for BindAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Top-level application configuration.
///
/// Constructed directly (it's a plain struct), loaded from environment variables, or
/// deserialized from a config file - whatever a given deployment prefers. There is no
/// hidden global; an [`crate::app::Application`] takes one explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where to listen for connections.
    pub bind: BindAddress,

    /// The maximum request body size, in bytes, before a request is rejected with `413
    /// Payload Too Large`.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

const fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

impl AppConfig {
    /// Builds a config bound to a single TCP socket address, with the default body-size
    /// limit - the common case for local development and tests.
    #[must_use]
    pub fn bind_tcp(addr: SocketAddr) -> Self {
        Self {
            bind: BindAddress::Tcp(vec![addr]),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for AppConfig {
    /// `127.0.0.1:8080` with the default body-size limit (§6 "listen.port (u16, default
    /// 8080), listen.address (string, default 127.0.0.1)").
    fn default() -> Self {
        Self::bind_tcp(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_tcp_addrs() {
        let parsed: BindAddress = "127.0.0.1:8080,[::1]:8080".parse().unwrap();
        assert_eq!(
            parsed,
            BindAddress::Tcp(vec![
                "127.0.0.1:8080".parse().unwrap(),
                "[::1]:8080".parse().unwrap(),
            ])
        );
    }

    #[cfg(unix)]
    #[test]
    fn parses_unix_socket_path() {
        let parsed: BindAddress = "unix:/run/app.sock".parse().unwrap();
        assert_eq!(parsed, BindAddress::Unix("/run/app.sock".into()));
    }

    #[test]
    fn rejects_garbage() {
        assert!("not an address".parse::<BindAddress>().is_err());
    }

    #[test]
    fn default_binds_localhost_8080() {
        let config = AppConfig::default();
        assert_eq!(
            config.bind,
            BindAddress::Tcp(vec!["127.0.0.1:8080".parse().unwrap()])
        );
        assert_eq!(config.max_body_bytes, default_max_body_bytes());
    }
}

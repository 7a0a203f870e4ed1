// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Service configuration and environment variable handling.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{Precision, CACHE_FILE_NAME};
use crate::error::{Error, Result};
use crate::net::DEFAULT_FETCH_TIMEOUT;

/// Default precision order: network, then analytic, then approximate.
pub const DEFAULT_PREFER_ORDER: [Precision; 3] = Precision::ALL;

const CACHE_DIR_NAME: &str = ".astronomical_watch";

/// Configuration of an [`EquinoxService`](crate::service::EquinoxService).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the cache file.
    pub cache_dir: PathBuf,
    /// Remote equinox source; the internet tier is disabled when `None`.
    pub equinox_url: Option<String>,
    pub fetch_timeout: Duration,
    /// Directory scanned for generated coefficient tables.
    pub coefficient_dir: Option<PathBuf>,
    pub prefer_order: Vec<Precision>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            equinox_url: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            coefficient_dir: None,
            prefer_order: DEFAULT_PREFER_ORDER.to_vec(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_DIR_NAME)
}

/// Non-empty value of `name`, if set.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `ASTRON_CACHE_DIR` (optional, default: `$HOME/.astronomical_watch`)
    /// - `ASTRON_EQUINOX_URL` (optional): remote equinox JSON source
    /// - `ASTRON_FETCH_TIMEOUT` (optional, default: 10): seconds
    /// - `ASTRON_COEFF_DIR` (optional): coefficient table directory
    /// - `ASTRON_PREFER_ORDER` (optional, default: `internet,analytic,approx`)
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] for a non-numeric or non-positive
    /// timeout or an unknown tier name.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let cache_dir = var("ASTRON_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);
        let equinox_url = var("ASTRON_EQUINOX_URL");
        let coefficient_dir = var("ASTRON_COEFF_DIR").map(PathBuf::from);

        let fetch_timeout = match var("ASTRON_FETCH_TIMEOUT") {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.fetch_timeout,
        };
        let prefer_order = match var("ASTRON_PREFER_ORDER") {
            Some(raw) => parse_prefer_order(&raw)?,
            None => defaults.prefer_order,
        };

        Ok(Self {
            cache_dir,
            equinox_url,
            fetch_timeout,
            coefficient_dir,
            prefer_order,
        })
    }

    /// Full path of the cache file.
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::invalid_input(format!("ASTRON_FETCH_TIMEOUT must be a number, got '{raw}'")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(Error::invalid_input(format!(
            "ASTRON_FETCH_TIMEOUT must be positive, got '{raw}'"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Parse a comma-separated tier list such as `analytic,approx`.
pub fn parse_prefer_order(raw: &str) -> Result<Vec<Precision>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.prefer_order, DEFAULT_PREFER_ORDER.to_vec());
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.equinox_url.is_none());
        assert!(config.cache_file().ends_with(".astronomical_watch/equinox_cache.json"));
    }

    #[test]
    fn prefer_order_parsing() {
        assert_eq!(
            parse_prefer_order("analytic, approx").unwrap(),
            vec![Precision::Analytic, Precision::Approx]
        );
        assert_eq!(parse_prefer_order(" , ").unwrap(), vec![]);
        assert!(matches!(
            parse_prefer_order("internet,ntp"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn timeout_parsing() {
        assert_eq!(parse_timeout("2.5").unwrap(), Duration::from_millis(2500));
        assert!(parse_timeout("soon").is_err());
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-3").is_err());
    }
}

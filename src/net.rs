// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Remote equinox sources.
//!
//! A source answers with a JSON object mapping years to RFC 3339 UTC
//! timestamps:
//!
//! ```json
//! {"2024": "2024-03-20T03:06:14Z", "2025": "2025-03-20T09:01:28Z"}
//! ```
//!
//! Every failure is a [`TierError`]; nothing here retries.

use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

use crate::error::{Error, Result, TierError};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Sanity window for a vernal equinox date, in days of March.
pub const MARCH_DAY_MIN: u32 = 18;
pub const MARCH_DAY_MAX: u32 = 22;

/// Something that can be asked for the vernal equinox of a year.
pub trait EquinoxSource: Send + Sync {
    /// Short human-readable description (usually the URL).
    fn describe(&self) -> String;

    fn fetch(&self, year: i32) -> std::result::Result<DateTime<Utc>, TierError>;
}

/// HTTP GET against a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpEquinoxSource {
    url: reqwest::Url,
    client: reqwest::blocking::Client,
}

impl HttpEquinoxSource {
    /// Source for `url` with a per-request `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::invalid_input(format!("invalid equinox URL '{url}': {e}")))?;
        if url.host_str().is_none() {
            return Err(Error::invalid_input(format!("equinox URL '{url}' has no host")));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::invalid_input(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl EquinoxSource for HttpEquinoxSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn fetch(&self, year: i32) -> std::result::Result<DateTime<Utc>, TierError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| TierError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TierError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| TierError::Transport(e.to_string()))?;
        parse_equinox_json(&body, year)
    }
}

/// Extract and sanity-check the equinox of `year` from a source payload.
///
/// The year key may be written as any integer literal (`"2025"`,
/// `"+2025"`, `"2025.0"`).
pub fn parse_equinox_json(text: &str, year: i32) -> std::result::Result<DateTime<Utc>, TierError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| TierError::Malformed(format!("invalid JSON: {e}")))?;
    let map = value
        .as_object()
        .ok_or_else(|| TierError::Malformed("expected a JSON object".into()))?;

    let raw = map
        .get(&year.to_string())
        .or_else(|| {
            map.iter()
                .find(|(key, _)| key_matches_year(key, year))
                .map(|(_, v)| v)
        })
        .ok_or_else(|| TierError::Malformed(format!("no entry for {year}")))?;

    let text = raw
        .as_str()
        .ok_or_else(|| TierError::Malformed(format!("entry for {year} is not a string")))?;
    let t = DateTime::parse_from_rfc3339(text.trim())
        .map_err(|e| TierError::Malformed(format!("'{text}' is not RFC 3339: {e}")))?
        .with_timezone(&Utc);

    if !validate_equinox_timestamp(&t, year) {
        return Err(TierError::Rejected(format!(
            "{t} is outside March {MARCH_DAY_MIN}–{MARCH_DAY_MAX} of {year}"
        )));
    }
    Ok(t)
}

fn key_matches_year(key: &str, year: i32) -> bool {
    let key = key.trim();
    if let Ok(k) = key.parse::<i64>() {
        return k == i64::from(year);
    }
    key.parse::<f64>()
        .map(|k| k.fract() == 0.0 && k == f64::from(year))
        .unwrap_or(false)
}

/// Whether `t` lies in March 18–22 of `year`, UTC.
pub fn validate_equinox_timestamp(t: &DateTime<Utc>, year: i32) -> bool {
    t.year() == year && t.month() == 3 && (MARCH_DAY_MIN..=MARCH_DAY_MAX).contains(&t.day())
}

//! Stitcher deployments

use std::fmt;
use std::str::FromStr;

use crate::error::StitcherError;

const SHORTHANDS: &[(&str, &str)] = &[
    ("prod", "https://stitcher.ncats.io/"),
    ("dev", "https://stitcher-dev.ncats.io/"),
    ("test", "https://stitcher-test.ncats.io/"),
    ("local", "http://localhost:8080/"),
    ("docker", "http://localhost:9003/"),
];

/// Base URL of a Stitcher instance, always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base: String,
}

impl Site {
    /// A shorthand (`prod`, `dev`, `test`, `local`, `docker`) or an http(s) URL.
    pub fn parse(s: &str) -> Result<Self, StitcherError> {
        let s = s.trim();
        if let Some((_, url)) = SHORTHANDS.iter().find(|(k, _)| k.eq_ignore_ascii_case(s)) {
            return Ok(Self {
                base: (*url).to_string(),
            });
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self {
                base: format!("{}/", s.trim_end_matches('/')),
            });
        }
        Err(StitcherError::Site(s.to_string()))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `path` resolved against the base; a leading `/` is tolerated.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }
}

impl Default for Site {
    /// Production
    fn default() -> Self {
        Self {
            base: SHORTHANDS[0].1.to_string(),
        }
    }
}

impl FromStr for Site {
    type Err = StitcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

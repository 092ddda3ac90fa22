use std::{fmt, net::Ipv4Addr};

use lazy_regex::{Lazy, lazy_regex};
use regex::Regex;

use crate::core::error::ValidationError;

static IPV4: Lazy<Regex> = lazy_regex!(
    r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$"
);

static HOSTNAME: Lazy<Regex> = lazy_regex!(
    r"^[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Ipv4(Ipv4Addr),
    Hostname,
}

/// A host the scanning service is asked to probe.
///
/// Only built through [`Target::parse`], so the text always satisfies
/// the IPv4 or hostname grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    host: String,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let host = input.trim();
        if host.is_empty() {
            return Err(ValidationError::MissingTarget);
        }

        if !IPV4.is_match(host) && !HOSTNAME.is_match(host) {
            return Err(ValidationError::InvalidTarget);
        }

        Ok(Self {
            host: host.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.host
    }

    /// Dotted quads with leading zeros pass the grammar but are not
    /// canonical literals; they are reported as hostnames.
    pub fn kind(&self) -> TargetKind {
        match self.host.parse::<Ipv4Addr>() {
            Ok(ip) => TargetKind::Ipv4(ip),
            Err(_) => TargetKind::Hostname,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

use std::fmt;

use lazy_regex::{Lazy, lazy_regex};
use regex::Regex;

use crate::core::error::ValidationError;

// ASCII digits only.
static RANGE: Lazy<Regex> = lazy_regex!(r"^([0-9]+)-([0-9]+)$");
static LIST: Lazy<Regex> = lazy_regex!(r"^[0-9]+(?:,[0-9]+)*$");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortSpecKind {
    Range,
    List,
}

/// Textual port selection as sent to the scanning service.
///
/// Only the grammar is checked here. Bounds (`1..=65535`) and range
/// ordering are left to the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSpec {
    raw: String,
    kind: PortSpecKind,
}

impl PortSpec {
    /// Range: 1-1000
    /// List: 22,80,443
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        let kind = if RANGE.is_match(raw) {
            PortSpecKind::Range
        } else if LIST.is_match(raw) {
            PortSpecKind::List
        } else {
            return Err(ValidationError::InvalidPortRange);
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    /// Preset name or literal spec.
    pub fn resolve(input: &str) -> Result<Self, ValidationError> {
        match PortPreset::from_name(input.trim()) {
            Some(preset) => Ok(preset.spec()),
            None => Self::parse(input),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> PortSpecKind {
        self.kind
    }

    /// How many ports this selects, if every number fits a `u32`.
    /// Reversed ranges count the same as their ordered form.
    pub fn estimated_count(&self) -> Option<u32> {
        match self.kind {
            PortSpecKind::Range => {
                let caps = RANGE.captures(&self.raw)?;
                let low: u32 = caps[1].parse().ok()?;
                let high: u32 = caps[2].parse().ok()?;
                Some(low.abs_diff(high) + 1)
            }
            PortSpecKind::List => u32::try_from(self.raw.split(',').count()).ok(),
        }
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        PortPreset::default().spec()
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Named port selections offered by the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortPreset {
    #[default]
    Common,
    WellKnown,
    All,
    Web,
    Database,
}

impl PortPreset {
    pub const ALL: [PortPreset; 5] = [
        PortPreset::Common,
        PortPreset::WellKnown,
        PortPreset::All,
        PortPreset::Web,
        PortPreset::Database,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::WellKnown => "well-known",
            Self::All => "all",
            Self::Web => "web",
            Self::Database => "database",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Common => "Common Ports (1-1000)",
            Self::WellKnown => "Well-known Ports (1-1024)",
            Self::All => "All Ports (1-65535)",
            Self::Web => "Web Services (80,443,8080,8443)",
            Self::Database => "Database Ports (3306,5432,6379)",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Self::Common => "1-1000",
            Self::WellKnown => "1-1024",
            Self::All => "1-65535",
            Self::Web => "80,443,8080,8443",
            Self::Database => "3306,5432,6379",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn spec(&self) -> PortSpec {
        let kind = if self.value().contains('-') {
            PortSpecKind::Range
        } else {
            PortSpecKind::List
        };
        PortSpec {
            raw: self.value().to_string(),
            kind,
        }
    }
}

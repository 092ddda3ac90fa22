//! Wire model of the scanning service's report.
//!
//! The report is authoritative: nothing here recounts or reorders what
//! the service sent.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::core::error::ReportError;

/// Format the service stamps `scan_time` with.
pub const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

impl PortState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Filtered => "filtered",
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    pub port: u16,
    pub state: PortState,
    pub service: String,
    #[serde(default)]
    pub version: Option<String>,
    pub protocol: String,
}

impl PortEntry {
    /// Version text for tables; absent and empty both read as `N/A`.
    pub fn version_display(&self) -> &str {
        match self.version.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => "N/A",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub cvss_score: f64,
    pub affected_service: String,
    pub port: u16,
    pub recommendation: String,
}

/// Count for one severity label, in the order the service listed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub label: String,
    pub count: u64,
}

/// `severity_breakdown` keeps the JSON object's key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityBreakdown(pub Vec<SeverityCount>);

impl SeverityBreakdown {
    pub fn iter(&self) -> impl Iterator<Item = &SeverityCount> {
        self.0.iter()
    }
}

impl<I: Into<String>> FromIterator<(I, u64)> for SeverityBreakdown {
    fn from_iter<T: IntoIterator<Item = (I, u64)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(label, count)| SeverityCount {
                    label: label.into(),
                    count,
                })
                .collect(),
        )
    }
}

impl Serialize for SeverityBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for c in &self.0 {
            map.serialize_entry(&c.label, &c.count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SeverityBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = SeverityBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of severity label to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts: Vec<SeverityCount> = Vec::with_capacity(access.size_hint().unwrap_or(4));
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    // Later duplicates overwrite in place, like a JS object.
                    match counts.iter_mut().find(|c| c.label == label) {
                        Some(existing) => existing.count = count,
                        None => counts.push(SeverityCount { label, count }),
                    }
                }
                Ok(SeverityBreakdown(counts))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_ports_scanned: u64,
    pub open_ports: u64,
    pub closed_ports: u64,
    pub services_detected: u64,
    pub vulnerabilities_found: u64,
    pub severity_breakdown: SeverityBreakdown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub scan_time: String,
    pub ports: Vec<PortEntry>,
    pub services: Vec<PortEntry>,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Optional on the wire so its absence is reported by the normalizer.
    #[serde(default)]
    pub summary: Option<Summary>,
}

impl ScanReport {
    pub fn from_json(body: &[u8]) -> Result<Self, ReportError> {
        serde_json::from_slice(body).map_err(|e| ReportError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "target": "example.com",
        "scan_time": "2024-03-01 12:30:45",
        "ports": [
            {"port": 22, "state": "open", "service": "ssh", "version": "8.9", "protocol": "tcp"},
            {"port": 23, "state": "closed", "service": "telnet", "version": "", "protocol": "tcp"},
            {"port": 53, "state": "filtered", "service": "domain", "protocol": "udp"}
        ],
        "services": [
            {"port": 22, "state": "open", "service": "SSH", "version": "Version 3.1", "protocol": "tcp"}
        ],
        "vulnerabilities": [
            {"id": "CVE-2023-5678", "title": "Weak SSH Configuration", "description": "d",
             "severity": "Medium", "cvss_score": 6.8, "affected_service": "SSH", "port": 22,
             "recommendation": "r"}
        ],
        "summary": {
            "total_ports_scanned": 3, "open_ports": 1, "closed_ports": 1,
            "services_detected": 1, "vulnerabilities_found": 1,
            "severity_breakdown": {"Medium": 1, "Critical": 0, "High": 0, "Low": 0}
        }
    }"#;

    #[test]
    fn decodes_service_report() {
        let report = ScanReport::from_json(REPORT.as_bytes()).unwrap();
        assert_eq!(report.ports.len(), 3);
        assert_eq!(report.ports[2].state, PortState::Filtered);
        assert_eq!(report.ports[2].version, None);
        assert_eq!(report.ports[1].version_display(), "N/A");
        assert_eq!(report.vulnerabilities[0].severity, Severity::Medium);
        assert!(report.summary.is_some());
    }

    #[test]
    fn breakdown_keeps_key_order() {
        let report = ScanReport::from_json(REPORT.as_bytes()).unwrap();
        let labels: Vec<_> = report
            .summary
            .unwrap()
            .severity_breakdown
            .iter()
            .map(|c| c.label.clone())
            .collect();
        assert_eq!(labels, ["Medium", "Critical", "High", "Low"]);
    }

    #[test]
    fn breakdown_serializes_in_order() {
        let breakdown: SeverityBreakdown = [("Low", 2), ("Critical", 1)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&breakdown).unwrap(),
            r#"{"Low":2,"Critical":1}"#
        );
    }

    #[test]
    fn missing_summary_still_decodes() {
        let body = r#"{"target":"a","scan_time":"t","ports":[],"services":[],"vulnerabilities":[]}"#;
        let report = ScanReport::from_json(body.as_bytes()).unwrap();
        assert!(report.summary.is_none());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = ScanReport::from_json(br#"{"target": "a"}"#).unwrap_err();
        assert!(matches!(err, ReportError::Malformed(_)));
        assert!(matches!(
            ScanReport::from_json(b"not json"),
            Err(ReportError::Malformed(_))
        ));
    }
}

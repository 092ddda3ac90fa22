use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::{
    error::ReportError,
    report::{PortEntry, SCAN_TIME_FORMAT, ScanReport, SeverityCount, Vulnerability},
};

pub const PORT_STATE_LABELS: [&str; 3] = ["Open", "Closed", "Filtered"];

/// Open/closed are the service's totals; filtered is the remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PortStateSeries {
    pub open: u64,
    pub closed: u64,
    pub filtered: u64,
}

impl PortStateSeries {
    pub fn as_array(&self) -> [u64; 3] {
        [self.open, self.closed, self.filtered]
    }

    pub fn total(&self) -> u64 {
        self.open + self.closed + self.filtered
    }
}

/// Presentation-ready aggregates for one report. Rebuilt from scratch for
/// every report and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DerivedViewModel {
    pub target: String,
    pub scan_time: String,
    pub total_ports_scanned: u64,
    pub services_detected: u64,
    pub vulnerabilities_found: u64,
    pub port_states: PortStateSeries,
    pub severities: Vec<SeverityCount>,
    pub services: Vec<PortEntry>,
    pub ports: Vec<PortEntry>,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl DerivedViewModel {
    /// `scan_time` as a timestamp, when the service used its usual format.
    pub fn scan_time_parsed(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.scan_time, SCAN_TIME_FORMAT).ok()
    }

    /// Display form of `scan_time`; anything unparseable is shown verbatim.
    pub fn scan_time_label(&self) -> String {
        match self.scan_time_parsed() {
            Some(ts) => ts.format("%d %b %Y %H:%M:%S").to_string(),
            None => self.scan_time.clone(),
        }
    }

    pub fn severity_labels(&self) -> Vec<&str> {
        self.severities.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn severity_counts(&self) -> Vec<u64> {
        self.severities.iter().map(|s| s.count).collect()
    }

    pub fn severity_count(&self, label: &str) -> u64 {
        self.severities
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.count)
            .unwrap_or(0)
    }
}

/// Derive the dashboard view of a report.
///
/// Zero-count severity entries are dropped so the buckets name exactly the
/// severities that occur; the remaining order is the service's key order.
pub fn normalize(report: &ScanReport) -> Result<DerivedViewModel, ReportError> {
    let summary = report
        .summary
        .as_ref()
        .ok_or_else(|| ReportError::Malformed("report has no summary".into()))?;

    let filtered = summary
        .total_ports_scanned
        .checked_sub(summary.open_ports)
        .and_then(|rest| rest.checked_sub(summary.closed_ports))
        .ok_or_else(|| {
            ReportError::Malformed(format!(
                "open ({}) + closed ({}) exceeds total ports scanned ({})",
                summary.open_ports, summary.closed_ports, summary.total_ports_scanned
            ))
        })?;

    let severities = summary
        .severity_breakdown
        .iter()
        .filter(|c| c.count > 0)
        .cloned()
        .collect();

    Ok(DerivedViewModel {
        target: report.target.clone(),
        scan_time: report.scan_time.clone(),
        total_ports_scanned: summary.total_ports_scanned,
        services_detected: summary.services_detected,
        vulnerabilities_found: summary.vulnerabilities_found,
        port_states: PortStateSeries {
            open: summary.open_ports,
            closed: summary.closed_ports,
            filtered,
        },
        severities,
        services: report.services.clone(),
        ports: report.ports.clone(),
        vulnerabilities: report.vulnerabilities.clone(),
    })
}

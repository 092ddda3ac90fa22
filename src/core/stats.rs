use chrono::{DateTime, Utc};

use crate::core::{engine::ScanMeta, normalize::DerivedViewModel};

/// Dashboard cards, aggregated over the scans finished in this session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionStats {
    pub scans_completed: u64,
    pub scans_failed: u64,
    pub open_ports_seen: u64,
    pub vulnerabilities_found: u64,
    pub critical_findings: u64,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_target: Option<String>,
}

impl SessionStats {
    pub fn record_success(&mut self, view: &DerivedViewModel, meta: &ScanMeta) {
        self.scans_completed += 1;
        self.open_ports_seen += view.port_states.open;
        self.vulnerabilities_found += view.vulnerabilities_found;
        self.critical_findings += view.severity_count("Critical");
        self.touch(meta);
    }

    pub fn record_failure(&mut self, meta: &ScanMeta) {
        self.scans_failed += 1;
        self.touch(meta);
    }

    pub fn total_scans(&self) -> u64 {
        self.scans_completed + self.scans_failed
    }

    /// Share of finished scans that produced a report, in percent.
    pub fn success_rate(&self) -> Option<f64> {
        match self.total_scans() {
            0 => None,
            n => Some(self.scans_completed as f64 * 100.0 / n as f64),
        }
    }

    fn touch(&mut self, meta: &ScanMeta) {
        self.last_scan_at = Some(meta.started_at);
        self.last_target = Some(meta.target.clone());
    }
}

use std::fmt::Write;

use surfacewatch::core::{DerivedViewModel, ScanMeta, normalize::PORT_STATE_LABELS};

/// Plain-text report printed by headless runs.
pub fn report_text(view: &DerivedViewModel, meta: &ScanMeta) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Target: {} | Scan Time: {}", view.target, view.scan_time_label());
    let _ = writeln!(
        out,
        "Ports: {} | Submitted: {} | Took: {} ms",
        meta.port_range,
        meta.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        meta.duration_ms
    );
    let _ = writeln!(
        out,
        "Total ports scanned: {} | Services detected: {} | Vulnerabilities: {}",
        view.total_ports_scanned, view.services_detected, view.vulnerabilities_found
    );

    let states: Vec<String> = PORT_STATE_LABELS
        .iter()
        .zip(view.port_states.as_array())
        .map(|(label, count)| format!("{label} {count}"))
        .collect();
    let _ = writeln!(out, "Port states: {}", states.join(", "));

    if !view.severities.is_empty() {
        let severities: Vec<String> = view
            .severities
            .iter()
            .map(|s| format!("{} {}", s.label, s.count))
            .collect();
        let _ = writeln!(out, "Severity: {}", severities.join(", "));
    }

    if !view.services.is_empty() {
        let _ = writeln!(out, "\nOPEN PORTS & SERVICES");
        for s in &view.services {
            let _ = writeln!(
                out,
                "  {:<7} {:<14} {:<22} {}",
                format!("{}/{}", s.port, s.protocol),
                s.service,
                s.version_display(),
                s.state
            );
        }
    }

    if !view.vulnerabilities.is_empty() {
        let _ = writeln!(out, "\nVULNERABILITIES");
        for v in &view.vulnerabilities {
            let _ = writeln!(
                out,
                "  [{}] {} {} (CVSS {}) on {} port {}",
                v.severity, v.id, v.title, v.cvss_score, v.affected_service, v.port
            );
            let _ = writeln!(out, "      {}", v.recommendation);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use surfacewatch::core::{
        PortStateSeries,
        report::{PortEntry, PortState, SeverityCount},
    };

    use super::*;

    #[test]
    fn renders_summary_lines() {
        let view = DerivedViewModel {
            target: "192.168.1.1".into(),
            scan_time: "2024-03-01 12:30:45".into(),
            total_ports_scanned: 1000,
            services_detected: 1,
            vulnerabilities_found: 0,
            port_states: PortStateSeries {
                open: 5,
                closed: 990,
                filtered: 5,
            },
            severities: vec![SeverityCount {
                label: "Low".into(),
                count: 2,
            }],
            services: vec![PortEntry {
                port: 22,
                state: PortState::Open,
                service: "SSH".into(),
                version: None,
                protocol: "tcp".into(),
            }],
            ports: vec![],
            vulnerabilities: vec![],
        };
        let meta = ScanMeta {
            target: "192.168.1.1".into(),
            port_range: "1-1000".into(),
            started_at: Utc::now(),
            duration_ms: 1200,
        };

        let text = report_text(&view, &meta);
        assert!(text.contains("Scan Time: 01 Mar 2024 12:30:45"));
        assert!(text.contains("Port states: Open 5, Closed 990, Filtered 5"));
        assert!(text.contains("Severity: Low 2"));
        assert!(text.contains("22/tcp"));
        assert!(!text.contains("VULNERABILITIES\n"));
    }
}

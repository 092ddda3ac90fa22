use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap},
};

use surfacewatch::core::{
    DerivedViewModel, PortPreset, SubmitState, normalize::PORT_STATE_LABELS,
};

use super::{
    terminal::{App, UiState, View},
    theme,
};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

// =======================
// UI RENDER
// =======================
pub fn draw_ui(f: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(f.size());

    let exit_hint = match app.state {
        UiState::ExitPending => " | EXIT? (Enter)",
        UiState::Idle => "",
    };
    f.render_widget(
        Paragraph::new(format!(
            " SURFACEWATCH | STATE: {} | SERVICE: {}{} ",
            app.submitter.state().label(),
            app.service_url,
            exit_hint
        ))
        .style(theme::STATUS_BAR),
        layout[0],
    );

    // Typing is still allowed while pending; `scan` itself is refused.
    let (title, style) = if app.submitter.is_pending() {
        (" COMMAND (scan running, `abort` to stop) ", theme::COMMAND_DISABLED)
    } else {
        (" COMMAND ", theme::COMMAND)
    };
    f.render_widget(
        Paragraph::new(format!("> {}", app.command))
            .block(Block::default().title(title).borders(Borders::ALL))
            .style(style),
        layout[1],
    );

    match (app.view, app.submitter.last_view()) {
        (View::Results, Some(view)) => draw_results(f, layout[2], view, app.scroll),
        _ => draw_dashboard(f, layout[2], app),
    }

    f.render_widget(
        Paragraph::new(app.events.join("\n"))
            .block(Block::default().title(" EVENTS ").borders(Borders::ALL)),
        layout[3],
    );
}

// =======================
// DASHBOARD
// =======================
fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let stats = app.submitter.stats();
    let success = stats
        .success_rate()
        .map(|r| format!("{r:.0}%"))
        .unwrap_or_else(|| "-".into());
    draw_cards(
        f,
        chunks[0],
        &[
            ("SCANS", format!("{} ({success} ok)", stats.total_scans()), theme::CARD_TOTAL),
            ("OPEN PORTS SEEN", stats.open_ports_seen.to_string(), theme::CARD_OPEN),
            ("VULNERABILITIES", stats.vulnerabilities_found.to_string(), theme::CARD_VULNS),
            ("CRITICAL", stats.critical_findings.to_string(), theme::CARD_OPEN),
        ],
    );

    let mut lines: Vec<Line> = Vec::new();
    match app.submitter.state() {
        SubmitState::Idle => {
            lines.push(Line::from("Ready. Usage: scan <ip|domain> [ports]"));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("[ PORT PRESETS ]", theme::HEADING)));
            for preset in PortPreset::ALL {
                lines.push(Line::from(format!("  {:<11} {}", preset.name(), preset.label())));
            }
        }
        SubmitState::Pending { request, timer, .. } => {
            let secs = timer.elapsed().as_secs();
            let spin = SPINNER[(timer.elapsed().as_millis() / 250) as usize % SPINNER.len()];
            lines.push(Line::from(Span::styled(
                format!(
                    "{spin} Scanning {} on ports {} ({secs}s)",
                    request.target(),
                    request.port_range()
                ),
                theme::PENDING,
            )));
            lines.push(Line::from(Span::styled(
                "This may take a few minutes...",
                theme::TEXT_DIM,
            )));
        }
        SubmitState::Succeeded { view, meta } => {
            lines.push(Line::from(format!(
                "Last scan: {} ({}) in {} ms",
                view.target, meta.port_range, meta.duration_ms
            )));
            lines.push(Line::from(format!(
                "{} open ports, {} services, {} vulnerabilities",
                view.port_states.open, view.services_detected, view.vulnerabilities_found
            )));
            lines.push(Line::from(Span::styled("Type `results` to open the report", theme::TEXT_DIM)));
        }
        SubmitState::Failed { error, meta } => {
            lines.push(Line::from(Span::styled(error.to_string(), theme::TEXT_ERROR)));
            lines.push(Line::from(Span::styled(
                format!("target {} ports {}", meta.target, meta.port_range),
                theme::TEXT_DIM,
            )));
            if app.submitter.last_view().is_some() {
                lines.push(Line::from(Span::styled(
                    "Previous results are still available via `results`",
                    theme::TEXT_DIM,
                )));
            }
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title(" SCAN ").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );
}

fn draw_cards(f: &mut Frame, area: Rect, cards: &[(&str, String, Style)]) {
    let constraints: Vec<Constraint> = cards
        .iter()
        .map(|_| Constraint::Ratio(1, cards.len() as u32))
        .collect();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for ((title, value, style), col) in cards.iter().zip(cols.iter()) {
        f.render_widget(
            Paragraph::new(Span::styled(value.clone(), style.patch(theme::TEXT_BOLD)))
                .alignment(Alignment::Center)
                .block(Block::default().title(format!(" {title} ")).borders(Borders::ALL)),
            *col,
        );
    }
}

// =======================
// RESULTS
// =======================
fn draw_results(f: &mut Frame, area: Rect, view: &DerivedViewModel, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Min(5),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(format!(
            " Target: {} | Scan Time: {} | Esc: back",
            view.target,
            view.scan_time_label()
        ))
        .style(theme::TEXT_BOLD),
        chunks[0],
    );

    draw_cards(
        f,
        chunks[1],
        &[
            ("TOTAL PORTS SCANNED", view.total_ports_scanned.to_string(), theme::CARD_TOTAL),
            ("OPEN PORTS", view.port_states.open.to_string(), theme::CARD_OPEN),
            ("SERVICES DETECTED", view.services_detected.to_string(), theme::CARD_SERVICES),
            ("VULNERABILITIES", view.vulnerabilities_found.to_string(), theme::CARD_VULNS),
        ],
    );

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    draw_port_chart(f, charts[0], view);
    draw_severity_chart(f, charts[1], view);

    let lines = detail_lines(view);
    let body = chunks[3];
    let visible = body.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    let start = scroll.min(max_scroll);
    let end = (start + visible).min(lines.len());

    f.render_widget(
        Paragraph::new(lines[start..end].to_vec())
            .block(Block::default().title(" REPORT (↑ ↓ PgUp PgDn) ").borders(Borders::ALL)),
        body,
    );
}

fn draw_port_chart(f: &mut Frame, area: Rect, view: &DerivedViewModel) {
    let states = [
        surfacewatch::core::PortState::Open,
        surfacewatch::core::PortState::Closed,
        surfacewatch::core::PortState::Filtered,
    ];
    let bars: Vec<Bar> = view
        .port_states
        .as_array()
        .into_iter()
        .zip(PORT_STATE_LABELS)
        .zip(states)
        .map(|((count, label), state)| {
            Bar::default()
                .value(count)
                .label(Line::from(label))
                .style(theme::port_state_style(state))
        })
        .collect();

    f.render_widget(
        BarChart::default()
            .block(Block::default().title(" PORT STATES ").borders(Borders::ALL))
            .bar_width(bar_width(area, bars.len()))
            .bar_gap(2)
            .data(BarGroup::default().bars(&bars)),
        area,
    );
}

fn draw_severity_chart(f: &mut Frame, area: Rect, view: &DerivedViewModel) {
    let block = Block::default().title(" VULNERABILITY SEVERITY ").borders(Borders::ALL);

    if view.severities.is_empty() {
        f.render_widget(
            Paragraph::new("No vulnerabilities detected")
                .style(theme::TEXT_DIM)
                .block(block),
            area,
        );
        return;
    }

    let bars: Vec<Bar> = view
        .severities
        .iter()
        .map(|s| {
            Bar::default()
                .value(s.count)
                .label(Line::from(s.label.clone()))
                .style(theme::severity_style(&s.label))
        })
        .collect();

    f.render_widget(
        BarChart::default()
            .block(block)
            .bar_width(bar_width(area, bars.len()))
            .bar_gap(2)
            .data(BarGroup::default().bars(&bars)),
        area,
    );
}

fn bar_width(area: Rect, bars: usize) -> u16 {
    let inner = area.width.saturating_sub(2) as usize;
    let per_bar = inner / bars.max(1);
    per_bar.saturating_sub(2).clamp(3, 12) as u16
}

/// Services table, vulnerability list and the full port table, in the
/// order the service reported them.
fn detail_lines(view: &DerivedViewModel) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(Line::from(Span::styled(
        format!("[ OPEN PORTS & SERVICES ] {} services detected on open ports", view.services.len()),
        theme::HEADING,
    )));
    lines.push(Line::from(Span::styled(
        format!("{:<7} {:<14} {:<22} {:<9} {}", "PORT", "SERVICE", "VERSION", "PROTOCOL", "STATUS"),
        theme::TEXT_BOLD,
    )));
    for s in &view.services {
        lines.push(Line::from(vec![
            Span::raw(format!(
                "{:<7} {:<14} {:<22} {:<9} ",
                s.port,
                s.service,
                s.version.as_deref().unwrap_or(""),
                s.protocol
            )),
            Span::styled(s.state.to_string(), theme::port_state_style(s.state)),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!("[ VULNERABILITY REPORT ] {} vulnerabilities detected", view.vulnerabilities.len()),
        theme::HEADING,
    )));
    for v in &view.vulnerabilities {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<9}", v.severity), theme::severity_style(v.severity.as_str())),
            Span::styled(v.title.clone(), theme::TEXT_BOLD),
            Span::raw(format!("  CVSS: {}", v.cvss_score)),
        ]));
        lines.push(Line::from(format!(
            "         CVE: {} | {} (Port {})",
            v.id, v.affected_service, v.port
        )));
        lines.push(Line::from(format!("         {}", v.description)));
        lines.push(Line::from(Span::styled(
            format!("         Recommendation: {}", v.recommendation),
            theme::TEXT_DIM,
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("[ COMPLETE PORT SCAN RESULTS ]", theme::HEADING)));
    lines.push(Line::from(Span::styled(
        format!("{:<7} {:<9} {:<14} {:<22} {}", "PORT", "STATE", "SERVICE", "VERSION", "PROTOCOL"),
        theme::TEXT_BOLD,
    )));
    for p in &view.ports {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<7} ", p.port)),
            Span::styled(format!("{:<9} ", p.state), theme::port_state_style(p.state)),
            Span::raw(format!(
                "{:<14} {:<22} {}",
                p.service,
                p.version_display(),
                p.protocol
            )),
        ]));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_width_bounds() {
        assert_eq!(bar_width(Rect::new(0, 0, 10, 10), 3), 3);
        assert_eq!(bar_width(Rect::new(0, 0, 200, 10), 3), 12);
        assert_eq!(bar_width(Rect::new(0, 0, 40, 10), 0), 12);
    }
}

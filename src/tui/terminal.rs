use std::{io, sync::Arc, time::Duration};

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use surfacewatch::{
    config::Config,
    core::{
        HttpScanService, PortPreset, ScanError, ScanReport, ScanService, SubmitState, Submitter,
        Target, TargetKind, engine,
    },
};

use super::render;

const MAX_EVENTS: usize = 8;

// =======================
// UI STATE
// =======================
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiState {
    Idle,
    ExitPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Results,
}

/// Result of a background scan task, tagged with its submission id.
struct ScanOutcome {
    id: u64,
    result: Result<ScanReport, ScanError>,
}

struct InFlight {
    id: u64,
    cancel: CancellationToken,
}

// =======================
// APP STATE
// =======================
pub struct App {
    pub state: UiState,
    pub view: View,
    pub command: String,
    pub events: Vec<String>,
    pub scroll: usize,
    pub submitter: Submitter,
    pub service_url: String,
    service: Arc<dyn ScanService>,
    timeout: Duration,
    in_flight: Option<InFlight>,
    outcome_tx: mpsc::UnboundedSender<ScanOutcome>,
}

impl App {
    fn new(
        config: &Config,
        service: Arc<dyn ScanService>,
        outcome_tx: mpsc::UnboundedSender<ScanOutcome>,
    ) -> Self {
        Self {
            state: UiState::Idle,
            view: View::Dashboard,
            command: String::new(),
            events: Vec::new(),
            scroll: 0,
            submitter: Submitter::new(),
            service_url: config.service_url.clone(),
            service,
            timeout: config.timeout(),
            in_flight: None,
            outcome_tx,
        }
    }

    fn event(&mut self, msg: impl Into<String>) {
        let ts = Local::now().format("%H:%M:%S");
        self.events.push(format!("[{}] {}", ts, msg.into()));
        if self.events.len() > MAX_EVENTS {
            self.events.remove(0);
        }
    }
}

// =======================
// ENTRY
// =======================
pub async fn run(config: Config, service: HttpScanService) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config, Arc::new(service), tx);
    app.event("SURFACEWATCH ready");
    app.event("Commands: scan <target> [ports] | presets | results | abort | help | exit");

    let res = blocking(|| event_loop(&mut terminal, &mut app, &mut rx));

    if let Some(flight) = app.in_flight.take() {
        flight.cancel.cancel();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Run the crossterm loop without stalling scan tasks on this worker.
/// Needs the multi-thread runtime; `block_in_place` panics on a current-thread one.
fn blocking<R>(f: impl FnOnce() -> R) -> R {
    tokio::task::block_in_place(f)
}

// =======================
// EVENT LOOP
// =======================
fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<ScanOutcome>,
) -> anyhow::Result<()> {
    loop {
        while let Ok(outcome) = rx.try_recv() {
            handle_outcome(outcome, app);
        }

        terminal.draw(|f| render::draw_ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char(c) => app.command.push(c),
                    KeyCode::Backspace => {
                        app.command.pop();
                    }
                    KeyCode::Up => {
                        app.scroll = app.scroll.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        app.scroll = app.scroll.saturating_add(1);
                    }
                    KeyCode::PageUp => {
                        app.scroll = app.scroll.saturating_sub(10);
                    }
                    KeyCode::PageDown => {
                        app.scroll = app.scroll.saturating_add(10);
                    }
                    KeyCode::Esc => match app.state {
                        UiState::ExitPending => {
                            app.state = UiState::Idle;
                            app.event("Exit cancelled");
                        }
                        UiState::Idle => {
                            app.view = View::Dashboard;
                            app.scroll = 0;
                        }
                    },
                    KeyCode::Enter => {
                        let cmd = app.command.trim().to_string();
                        app.command.clear();

                        match app.state {
                            UiState::ExitPending => return Ok(()),
                            UiState::Idle => handle_command(&cmd, app),
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

// =======================
// COMMAND HANDLER
// =======================
fn handle_command(cmd: &str, app: &mut App) {
    if cmd.is_empty() {
        return;
    }

    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.as_slice() {
        ["exit"] | ["q"] => {
            app.event("Exit requested, press Enter to confirm (Esc to stay)");
            app.state = UiState::ExitPending;
        }
        ["scan", ..] => handle_scan(&parts, app),
        ["abort"] => handle_abort(app),
        ["presets"] => {
            for preset in PortPreset::ALL {
                app.event(format!("{:<11} {}", preset.name(), preset.label()));
            }
        }
        ["results"] => {
            if app.submitter.last_view().is_some() {
                app.view = View::Results;
                app.scroll = 0;
            } else {
                app.event("No scan results available");
            }
        }
        ["back"] => {
            app.view = View::Dashboard;
            app.scroll = 0;
        }
        ["help"] => {
            app.event("scan <ip|domain> [range|list|preset]  e.g. scan example.com web");
            app.event("results / back switch views, abort stops the running scan");
        }
        _ => app.event("Unknown command"),
    }
}

// =======================
// SCAN HANDLER
// =======================
fn handle_scan(parts: &[&str], app: &mut App) {
    if parts.len() > 3 {
        app.event("Usage: scan <ip|domain> [ports]");
        return;
    }

    let target = parts.get(1).copied().unwrap_or("");
    let ports = parts.get(2).copied().unwrap_or(PortPreset::default().name());

    let submission = match app.submitter.begin(target, ports) {
        Ok(s) => s,
        Err(e) => {
            app.event(e.to_string());
            return;
        }
    };

    let kind = match Target::parse(submission.request.target()).map(|t| t.kind()) {
        Ok(TargetKind::Ipv4(_)) => "IPv4",
        _ => "host",
    };
    app.event(format!(
        "Scanning {} {} on ports {}",
        kind,
        submission.request.target(),
        submission.request.port_range()
    ));
    app.event("This may take a few minutes...");

    let cancel = CancellationToken::new();
    app.in_flight = Some(InFlight {
        id: submission.id,
        cancel: cancel.clone(),
    });

    let service = Arc::clone(&app.service);
    let tx = app.outcome_tx.clone();
    let deadline = app.timeout;
    tokio::spawn(async move {
        let result = engine::run(service.as_ref(), &submission.request, deadline, &cancel).await;
        // Receiver gone means the dashboard already closed.
        let _ = tx.send(ScanOutcome {
            id: submission.id,
            result,
        });
    });
}

fn handle_abort(app: &mut App) {
    match app.submitter.abort() {
        Some(id) => {
            if let Some(flight) = app.in_flight.take() {
                debug!(id = flight.id, "cancelling scan task");
                flight.cancel.cancel();
            }
            info!(id, "scan aborted by operator");
            app.event("Scan aborted");
        }
        None => app.event("No scan running"),
    }
}

fn handle_outcome(outcome: ScanOutcome, app: &mut App) {
    match app.in_flight.as_ref() {
        Some(flight) if flight.id == outcome.id => app.in_flight = None,
        _ => {
            debug!(id = outcome.id, "ignoring outcome of an aborted scan");
            return;
        }
    }

    match app.submitter.finish(outcome.id, outcome.result) {
        SubmitState::Succeeded { view, meta } => {
            let msg = format!(
                "Scan finished: {} open, {} vulnerabilities ({} ms)",
                view.port_states.open, view.vulnerabilities_found, meta.duration_ms
            );
            app.event(msg);
            app.view = View::Results;
            app.scroll = 0;
        }
        SubmitState::Failed { error, .. } => {
            let msg = error.to_string();
            app.event(msg);
        }
        SubmitState::Idle | SubmitState::Pending { .. } => {}
    }
}

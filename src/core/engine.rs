use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::{
    client::ScanService,
    error::{ScanError, SubmitError},
    normalize::{self, DerivedViewModel},
    ports::PortSpec,
    report::ScanReport,
    request::ScanRequest,
    stats::SessionStats,
};

/// Metadata recorded for every finished submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMeta {
    pub target: String,
    pub port_range: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
}

/// Single-slot submission state. At most one request is in flight.
#[derive(Debug, Clone)]
pub enum SubmitState {
    Idle,
    Pending {
        id: u64,
        request: ScanRequest,
        started_at: DateTime<Utc>,
        timer: Instant,
    },
    Succeeded {
        view: Arc<DerivedViewModel>,
        meta: ScanMeta,
    },
    Failed {
        error: ScanError,
        meta: ScanMeta,
    },
}

impl SubmitState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Pending { .. } => "SCANNING",
            Self::Succeeded { .. } => "DONE",
            Self::Failed { .. } => "FAILED",
        }
    }
}

/// Handle for an accepted submission; `id` ties the outcome back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub request: ScanRequest,
}

/// Drives one dashboard session through validate → pending → done.
#[derive(Debug)]
pub struct Submitter {
    state: SubmitState,
    next_id: u64,
    last_view: Option<Arc<DerivedViewModel>>,
    stats: SessionStats,
}

impl Default for Submitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Submitter {
    pub fn new() -> Self {
        Self {
            state: SubmitState::Idle,
            next_id: 1,
            last_view: None,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Latest successfully built view. Failed or rejected attempts keep it.
    pub fn last_view(&self) -> Option<&Arc<DerivedViewModel>> {
        self.last_view.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Validate the form and move to `Pending`.
    ///
    /// Refused while a request is in flight. A validation failure returns
    /// the form to `Idle` and never reaches the network.
    pub fn begin(&mut self, target: &str, port_spec: &str) -> Result<Submission, SubmitError> {
        if self.is_pending() {
            return Err(SubmitError::Busy);
        }

        let request = match ScanRequest::validate(target, port_spec) {
            Ok(r) => r,
            Err(e) => {
                info!(error = %e, "scan input rejected");
                self.state = SubmitState::Idle;
                return Err(e.into());
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        let estimated_ports = PortSpec::parse(request.port_range())
            .ok()
            .and_then(|p| p.estimated_count());
        info!(
            id,
            host = request.target(),
            ports = request.port_range(),
            estimated_ports = ?estimated_ports,
            "scan accepted"
        );
        self.state = SubmitState::Pending {
            id,
            request: request.clone(),
            started_at: Utc::now(),
            timer: Instant::now(),
        };

        Ok(Submission { id, request })
    }

    /// Resolve the pending submission `id`.
    ///
    /// Outcomes for anything other than the current pending id are stale
    /// (aborted earlier) and dropped.
    pub fn finish(&mut self, id: u64, outcome: Result<ScanReport, ScanError>) -> &SubmitState {
        let meta = match &self.state {
            SubmitState::Pending {
                id: pending,
                request,
                started_at,
                timer,
            } if *pending == id => ScanMeta {
                target: request.target().to_string(),
                port_range: request.port_range().to_string(),
                started_at: *started_at,
                duration_ms: timer.elapsed().as_millis(),
            },
            _ => {
                warn!(id, "dropping outcome of a submission that is no longer pending");
                return &self.state;
            }
        };

        let built = outcome.and_then(|report| normalize::normalize(&report).map_err(ScanError::from));

        self.state = match built {
            Ok(view) => {
                info!(
                    host = %meta.target,
                    open = view.port_states.open,
                    vulnerabilities = view.vulnerabilities_found,
                    duration_ms = meta.duration_ms as u64,
                    "scan finished"
                );
                let view = Arc::new(view);
                self.stats.record_success(&view, &meta);
                self.last_view = Some(Arc::clone(&view));
                SubmitState::Succeeded { view, meta }
            }
            Err(error) => {
                warn!(host = %meta.target, error = %error, "scan failed");
                self.stats.record_failure(&meta);
                SubmitState::Failed { error, meta }
            }
        };

        &self.state
    }

    /// Give up on the in-flight request. The caller cancels the task itself.
    pub fn abort(&mut self) -> Option<u64> {
        let id = match &self.state {
            SubmitState::Pending { id, .. } => *id,
            _ => return None,
        };
        self.finish(id, Err(ScanError::Cancelled));
        Some(id)
    }

    /// Validate, send, and resolve in one call.
    pub async fn submit(
        &mut self,
        service: &dyn ScanService,
        target: &str,
        port_spec: &str,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<&SubmitState, SubmitError> {
        let submission = self.begin(target, port_spec)?;
        let outcome = run(service, &submission.request, deadline, cancel).await;
        Ok(self.finish(submission.id, outcome))
    }
}

/// Send one request, bounded by `deadline` and abortable through `cancel`.
pub async fn run(
    service: &dyn ScanService,
    request: &ScanRequest,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<ScanReport, ScanError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ScanError::Cancelled),
        res = tokio::time::timeout(deadline, service.scan(request)) => match res {
            Ok(outcome) => outcome,
            Err(_) => Err(ScanError::Timeout { secs: deadline.as_secs() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::core::error::ValidationError;
    use crate::core::report::{SeverityBreakdown, Summary};

    /// Replays canned outcomes and records what it was asked.
    struct FakeService {
        outcome: Result<ScanReport, ScanError>,
        delay: Duration,
        seen: Mutex<Vec<ScanRequest>>,
    }

    impl FakeService {
        fn new(outcome: Result<ScanReport, ScanError>) -> Self {
            Self {
                outcome,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ScanService for FakeService {
        async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
            self.seen.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }
    }

    fn report(summary: bool) -> ScanReport {
        ScanReport {
            target: "192.168.1.1".into(),
            scan_time: "2024-03-01 12:30:45".into(),
            ports: vec![],
            services: vec![],
            vulnerabilities: vec![],
            summary: summary.then(|| Summary {
                total_ports_scanned: 1000,
                open_ports: 5,
                closed_ports: 990,
                services_detected: 5,
                vulnerabilities_found: 3,
                severity_breakdown: [("Critical", 1), ("Low", 2)].into_iter().collect::<SeverityBreakdown>(),
            }),
        }
    }

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn success_builds_view() {
        let svc = FakeService::new(Ok(report(true)));
        let mut sub = Submitter::new();
        let state = sub
            .submit(&svc, "192.168.1.1", "1-1000", DEADLINE, &CancellationToken::new())
            .await
            .unwrap();

        match state {
            SubmitState::Succeeded { view, meta } => {
                assert_eq!(view.port_states.as_array(), [5, 990, 5]);
                assert_eq!(meta.port_range, "1-1000");
            }
            other => panic!("unexpected state {other:?}"),
        }
        let seen = svc.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].target(), "192.168.1.1");
        drop(seen);
        assert_eq!(sub.stats().scans_completed, 1);
        assert_eq!(sub.stats().critical_findings, 1);
    }

    #[tokio::test]
    async fn rejection_sends_nothing() {
        let svc = FakeService::new(Ok(report(true)));
        let mut sub = Submitter::new();
        let err = sub
            .submit(&svc, "", "1-1000", DEADLINE, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Validation(ValidationError::MissingTarget));
        assert_eq!(svc.calls(), 0);
        assert!(matches!(sub.state(), SubmitState::Idle));
    }

    #[tokio::test]
    async fn service_error_message_surfaces() {
        let svc = FakeService::new(Err(ScanError::request_failed(
            Some("nmap not found".into()),
            Some(500),
        )));
        let mut sub = Submitter::new();
        let state = sub
            .submit(&svc, "example.com", "1-100", DEADLINE, &CancellationToken::new())
            .await
            .unwrap();
        match state {
            SubmitState::Failed { error, .. } => assert_eq!(error.to_string(), "nmap not found"),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(sub.stats().scans_failed, 1);
    }

    #[tokio::test]
    async fn missing_summary_fails_as_malformed() {
        let svc = FakeService::new(Ok(report(false)));
        let mut sub = Submitter::new();
        let state = sub
            .submit(&svc, "example.com", "1-100", DEADLINE, &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(
            state,
            SubmitState::Failed {
                error: ScanError::Malformed(_),
                ..
            }
        ));
    }

    #[test]
    fn second_submit_while_pending_is_refused() {
        let mut sub = Submitter::new();
        sub.begin("example.com", "1-100").unwrap();
        assert_eq!(sub.begin("example.org", "1-100"), Err(SubmitError::Busy));
        // Busy wins even over invalid input.
        assert_eq!(sub.begin("", "x"), Err(SubmitError::Busy));
        assert!(sub.is_pending());
    }

    #[test]
    fn failed_attempt_keeps_previous_view() {
        let mut sub = Submitter::new();
        let first = sub.begin("example.com", "1-1000").unwrap();
        sub.finish(first.id, Ok(report(true)));
        let kept = Arc::clone(sub.last_view().unwrap());

        let second = sub.begin("example.com", "1-1000").unwrap();
        sub.finish(second.id, Err(ScanError::request_failed(None, Some(502))));
        assert!(Arc::ptr_eq(sub.last_view().unwrap(), &kept));

        assert!(sub.begin("bad host", "1-1000").is_err());
        assert!(Arc::ptr_eq(sub.last_view().unwrap(), &kept));
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut sub = Submitter::new();
        let first = sub.begin("example.com", "1-1000").unwrap();
        assert_eq!(sub.abort(), Some(first.id));
        assert!(matches!(
            sub.state(),
            SubmitState::Failed {
                error: ScanError::Cancelled,
                ..
            }
        ));

        let second = sub.begin("example.org", "1-1000").unwrap();
        sub.finish(first.id, Ok(report(true)));
        assert!(sub.is_pending());
        sub.finish(second.id, Ok(report(true)));
        assert!(matches!(sub.state(), SubmitState::Succeeded { .. }));
    }

    #[test]
    fn abort_when_idle_is_noop() {
        let mut sub = Submitter::new();
        assert_eq!(sub.abort(), None);
        assert!(matches!(sub.state(), SubmitState::Idle));
    }

    #[tokio::test]
    async fn deadline_turns_into_timeout() {
        let mut svc = FakeService::new(Ok(report(true)));
        svc.delay = Duration::from_secs(60);
        let req = ScanRequest::validate("example.com", "1-10").unwrap();
        let res = run(&svc, &req, Duration::from_millis(20), &CancellationToken::new()).await;
        assert_eq!(res, Err(ScanError::Timeout { secs: 0 }));
    }

    #[tokio::test]
    async fn cancellation_aborts_request() {
        let mut svc = FakeService::new(Ok(report(true)));
        svc.delay = Duration::from_secs(60);
        let req = ScanRequest::validate("example.com", "1-10").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let res = run(&svc, &req, DEADLINE, &cancel).await;
        assert_eq!(res, Err(ScanError::Cancelled));
    }
}

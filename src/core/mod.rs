pub mod client;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod ports;
pub mod report;
pub mod request;
pub mod stats;
pub mod target;

pub use client::{HttpScanService, ScanService};
pub use engine::{ScanMeta, SubmitState, Submission, Submitter};
pub use error::{ReportError, ScanError, SubmitError, ValidationError};
pub use normalize::{DerivedViewModel, PortStateSeries, normalize};
pub use ports::{PortPreset, PortSpec};
pub use report::{PortEntry, PortState, ScanReport, Severity, Vulnerability};
pub use request::ScanRequest;
pub use stats::SessionStats;
pub use target::{Target, TargetKind};

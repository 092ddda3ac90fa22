use serde::Serialize;

use crate::core::{error::ValidationError, ports::PortSpec, target::Target};

/// Body of `POST /scan`.
///
/// Fields are private; a request only exists once both inputs validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    target: String,
    port_range: String,
}

impl ScanRequest {
    /// Checks run in order and the first failure wins.
    pub fn validate(target: &str, port_spec: &str) -> Result<Self, ValidationError> {
        let target = Target::parse(target)?;
        let ports = PortSpec::resolve(port_spec)?;
        Ok(Self::new(&target, &ports))
    }

    pub fn new(target: &Target, ports: &PortSpec) -> Self {
        Self {
            target: target.as_str().to_string(),
            port_range: ports.as_str().to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn port_range(&self) -> &str {
        &self.port_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_body() {
        let req = ScanRequest::validate("192.168.1.1", "1-1000").unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"target": "192.168.1.1", "port_range": "1-1000"})
        );
    }

    #[test]
    fn missing_target_wins_over_bad_ports() {
        assert_eq!(
            ScanRequest::validate("", "abc"),
            Err(ValidationError::MissingTarget)
        );
    }

    #[test]
    fn invalid_target_wins_over_bad_ports() {
        assert_eq!(
            ScanRequest::validate("not a host", "abc"),
            Err(ValidationError::InvalidTarget)
        );
    }

    #[test]
    fn bad_ports() {
        assert_eq!(
            ScanRequest::validate("example.com", "abc"),
            Err(ValidationError::InvalidPortRange)
        );
        assert_eq!(
            ScanRequest::validate("example.com", "١-١٠٠٠"),
            Err(ValidationError::InvalidPortRange)
        );
    }

    #[test]
    fn preset_name_expands() {
        let req = ScanRequest::validate("example.com", "database").unwrap();
        assert_eq!(req.port_range(), "3306,5432,6379");
    }
}

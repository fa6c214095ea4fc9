// Risk level value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    LOW,
    MEDIUM,
    HIGH,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::LOW => "LOW",
            RiskLevel::MEDIUM => "MEDIUM",
            RiskLevel::HIGH => "HIGH",
        }
    }

    /// Buckets a violation severity (0.0..=5.0) for reporting.
    pub fn from_severity(severity: f64) -> Self {
        if severity >= 4.0 {
            RiskLevel::HIGH
        } else if severity >= 2.5 {
            RiskLevel::MEDIUM
        } else {
            RiskLevel::LOW
        }
    }
}

use serde::{Deserialize, Serialize};

/// Severity as perceived by the patient or assessed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::Medium => "medium",
            SeverityLevel::High => "high",
            SeverityLevel::Critical => "critical",
        }
    }

    /// Map a free-form label from a reasoner reply; `None` for anything unknown.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(SeverityLevel::Low),
            "medium" => Some(SeverityLevel::Medium),
            "high" => Some(SeverityLevel::High),
            "critical" => Some(SeverityLevel::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently medical attention is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Immediate,
    WithinHours,
    #[default]
    WithinDays,
    Routine,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Immediate => "immediate",
            UrgencyLevel::WithinHours => "within_hours",
            UrgencyLevel::WithinDays => "within_days",
            UrgencyLevel::Routine => "routine",
        }
    }

    /// Map a free-form label from a reasoner reply; `None` for anything unknown.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "immediate" => Some(UrgencyLevel::Immediate),
            "within_hours" => Some(UrgencyLevel::WithinHours),
            "within_days" => Some(UrgencyLevel::WithinDays),
            "routine" => Some(UrgencyLevel::Routine),
            _ => None,
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnosis candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    #[default]
    ModelInference,
    MedicalDatabase,
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trips_through_serde() {
        let json = serde_json::to_string(&SeverityLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let back: SeverityLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SeverityLevel::High);
    }

    #[test]
    fn urgency_serializes_snake_case() {
        let json = serde_json::to_string(&UrgencyLevel::WithinHours).unwrap();
        assert_eq!(json, "\"within_hours\"");
    }

    #[test]
    fn from_label_tolerates_case_and_whitespace() {
        assert_eq!(SeverityLevel::from_label(" Critical "), Some(SeverityLevel::Critical));
        assert_eq!(UrgencyLevel::from_label("IMMEDIATE"), Some(UrgencyLevel::Immediate));
    }

    #[test]
    fn from_label_rejects_unknown() {
        assert_eq!(SeverityLevel::from_label("catastrophic"), None);
        assert_eq!(UrgencyLevel::from_label("yesterday"), None);
    }

    #[test]
    fn candidate_source_tags_match_wire_format() {
        let json = serde_json::to_string(&CandidateSource::MedicalDatabase).unwrap();
        assert_eq!(json, "\"medical_database\"");
    }
}

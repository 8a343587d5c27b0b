use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::SeverityLevel;

/// A condition detected by an external image analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedCondition {
    pub condition: String,
    pub confidence: f32,
}

/// Result of an external medical image analysis (skin, rash, wound, ...).
///
/// The analyzer itself lives outside this crate; only result storage and
/// retrieval per patient happen here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysisResult {
    pub image_type: String,
    pub detected_conditions: Vec<DetectedCondition>,
    pub recommendations: Vec<String>,
    pub severity_level: SeverityLevel,
    pub analyzed_at: DateTime<Utc>,
}

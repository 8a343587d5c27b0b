pub mod enums;

mod case;
mod diagnosis;
mod history;
mod image;

pub use case::{CaseDraft, MedicalCase};
pub use diagnosis::{DiagnosisCandidate, DiagnosisResponse, SymptomRequest};
pub use history::PatientHistory;
pub use image::{DetectedCondition, ImageAnalysisResult};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Diabetes classification attached to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiabetesType {
    #[serde(rename = "Type 1")]
    Type1,
    #[serde(rename = "Type 2")]
    Type2,
    Prediabetes,
}

impl DiabetesType {
    /// Wire spelling, as the backend and the multipart form expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiabetesType::Type1 => "Type 1",
            DiabetesType::Type2 => "Type 2",
            DiabetesType::Prediabetes => "Prediabetes",
        }
    }
}

impl fmt::Display for DiabetesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiabetesType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type 1" | "type1" => Ok(DiabetesType::Type1),
            "type 2" | "type2" => Ok(DiabetesType::Type2),
            "prediabetes" => Ok(DiabetesType::Prediabetes),
            other => Err(format!("unknown diabetes type: {other}")),
        }
    }
}

/// A patient submission, as returned by `GET /submissions`. Immutable from
/// the client's perspective: created server-side, read-only in every view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    #[serde(default)]
    pub patient_age: Option<u32>,
    /// Relative path, resolved against the API base for display.
    pub tongue_image_url: String,
    pub blood_glucose: f64,
    pub hba1c: f64,
    #[serde(default)]
    pub insulin_level: Option<f64>,
    pub diabetes_type: DiabetesType,
    pub symptoms: Vec<String>,
    pub medications: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a submission: the image bytes and the field values,
/// sent together as a single multipart request.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub image_file_name: String,
    pub image_bytes: Vec<u8>,
    pub blood_glucose: f64,
    pub hba1c: f64,
    pub insulin_level: Option<f64>,
    pub diabetes_type: DiabetesType,
    pub symptoms: Vec<String>,
    pub medications: Vec<String>,
    pub notes: Option<String>,
}

/// Aggregate counters shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub pending_doctors: u64,
    pub total_submissions: u64,
}

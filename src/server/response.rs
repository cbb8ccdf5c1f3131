use crate::core::MarksUpdate;
use crate::utils::error::{ErrorCategory, MarksError, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

impl MarksError {
    pub fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Client => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Export | ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarksError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {} (Category: {:?})", self, self.category());
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// A JSON scalar that may arrive either as a number or as text, e.g. a roll
/// number typed into a form field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseValue {
    /// Text form of the value. Whole floats keep their trailing `.0`, so
    /// `101.0` and `101` are different roll numbers.
    pub fn to_text(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 1e16 => format!("{:.1}", v),
            Self::Float(v) => v.to_string(),
            Self::Text(v) => v.clone(),
        }
    }

    pub fn to_int(&self, field: &str) -> Result<i64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(*v as i64),
            Self::Text(v) => v.trim().parse().map_err(|_| {
                MarksError::bad_request(format!("{} must be an integer, got '{}'", field, v))
            }),
            Self::Float(v) => Err(MarksError::bad_request(format!(
                "{} must be an integer, got '{}'",
                field, v
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarksRequest {
    pub roll_number: Option<LooseValue>,
    pub question: Option<LooseValue>,
    pub marks: Option<LooseValue>,
}

fn required<'a>(value: &'a Option<LooseValue>, field: &str) -> Result<&'a LooseValue> {
    value
        .as_ref()
        .ok_or_else(|| MarksError::bad_request(format!("Missing field: {}", field)))
}

impl UpdateMarksRequest {
    pub fn into_update(self) -> Result<MarksUpdate> {
        let roll_number = required(&self.roll_number, "rollNumber")?.to_text();
        let question = required(&self.question, "question")?.to_int("question")?;
        let marks = required(&self.marks, "marks")?.to_int("marks")?;
        MarksUpdate::new(roll_number, question, marks)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceEntryRequest {
    pub transcript: String,
}

use crate::core::export::{ExportArtifact, ExportFormat};
use crate::core::{MarksSnapshot, UpdateOutcome};
use crate::server::response::{UpdateMarksRequest, VoiceEntryRequest};
use crate::server::AppState;
use crate::utils::error::{MarksError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| MarksError::bad_request(rejection.body_text()))
}

pub async fn update_marks(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateMarksRequest>, JsonRejection>,
) -> Result<Json<UpdateOutcome>> {
    let update = json_body(payload)?.into_update()?;
    let outcome = state.engine.update(update).await?;
    Ok(Json(outcome))
}

pub async fn voice_entry(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VoiceEntryRequest>, JsonRejection>,
) -> Result<Json<UpdateOutcome>> {
    let request = json_body(payload)?;
    tracing::debug!("Voice transcript: {:?}", request.transcript);
    let outcome = state.engine.update_from_speech(&request.transcript).await?;
    Ok(Json(outcome))
}

pub async fn get_marks(State(state): State<AppState>) -> Result<Json<MarksSnapshot>> {
    Ok(Json(state.engine.marks().await?))
}

fn attachment(artifact: ExportArtifact) -> Response {
    let headers = [
        (header::CONTENT_TYPE, artifact.format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    (headers, artifact.data).into_response()
}

pub async fn download_excel(State(state): State<AppState>) -> Result<Response> {
    let artifact = state.engine.export(ExportFormat::Xlsx).await?;
    Ok(attachment(artifact))
}

pub async fn download_csv(State(state): State<AppState>) -> Result<Response> {
    let artifact = state.engine.export(ExportFormat::Csv).await?;
    Ok(attachment(artifact))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    let students = state.engine.store().len().await?;
    Ok(Json(json!({ "status": "ok", "students": students })))
}

pub async fn not_found() -> MarksError {
    MarksError::NotFound
}

use axum::{
    extract::{Json, Path},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::forms::{build_payload, FormKind, PayloadError, StepAction};

fn form_kind(raw: &str) -> Result<FormKind, ApiError> {
    FormKind::parse(raw).ok_or(ApiError::NotFound)
}

pub async fn describe_form(Path(kind): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let kind = form_kind(&kind)?;
    let steps = kind.steps();
    Ok(AxumJson(json!({ "kind": kind, "steps": steps, "total": steps.len() })))
}

#[derive(Deserialize)]
pub struct StepRequest {
    #[serde(default)]
    current: usize,
    action: StepAction,
}

pub async fn navigate_step(
    Path(kind): Path<String>,
    Json(req): Json<StepRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = form_kind(&kind)?;
    let mut wizard = kind.wizard().at(req.current);
    wizard.apply(req.action);
    Ok(AxumJson(json!({
        "step": wizard.step(),
        "total": wizard.total(),
        "title": kind.steps()[wizard.step()],
        "is_first": wizard.is_first(),
        "is_last": wizard.is_last(),
    })))
}

pub async fn submit_form(
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = form_kind(&kind)?;
    let payload = match build_payload(kind, body) {
        Ok(p) => p,
        Err(PayloadError::Invalid(errors)) => return Err(errors.into()),
        Err(PayloadError::Malformed(e)) => return Err(ApiError::BadRequest(format!("Malformed submission: {}", e))),
    };

    // Intake submissions are recorded in the log only; there is no backing store.
    let submission_id = Uuid::new_v4();
    let logged = serde_json::to_string(&payload).unwrap_or_default();
    tracing::info!(%submission_id, kind = ?kind, payload = %logged, "intake form submitted");

    Ok((
        StatusCode::ACCEPTED,
        AxumJson(json!({ "success": true, "submission_id": submission_id, "payload": payload })),
    ))
}

use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cms.get_events().await)
}

pub async fn list_past_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cms.get_past_events().await)
}

pub async fn list_gallery(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cms.get_gallery_items().await)
}

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json as AxumJson},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::validation::ValidationErrors;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ResolvedAddress {
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

fn resolve(resp: NominatimResponse) -> ResolvedAddress {
    let a = resp.address;
    let street: Vec<String> = [a.road, a.neighbourhood, a.suburb].into_iter().flatten().collect();
    let address = if street.is_empty() { resp.display_name } else { street.join(", ") };
    ResolvedAddress {
        address,
        city: a.city.or(a.town).or(a.village),
        state: a.state,
        postcode: a.postcode,
    }
}

pub async fn reverse(
    State(state): State<AppState>,
    Query(q): Query<ReverseQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !(-90.0..=90.0).contains(&q.lat) || !(-180.0..=180.0).contains(&q.lon) {
        return Err(ValidationErrors::single("coordinates", "Latitude or longitude out of range").into());
    }

    let url = format!(
        "{}/reverse?format=jsonv2&lat={}&lon={}",
        state.geocoder_base.trim_end_matches('/'),
        q.lat,
        q.lon
    );
    let resp = state
        .http
        .get(&url)
        .header("User-Agent", "DonationPortal/1.0")
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Reverse geocode error: {}", e);
            ApiError::Upstream("Location lookup failed".to_string())
        })?;

    if !resp.status().is_success() {
        tracing::warn!(status = resp.status().as_u16(), "Geocoder returned an error");
        return Err(ApiError::Upstream("Location lookup failed".to_string()));
    }
    let data: NominatimResponse = resp
        .json()
        .await
        .map_err(|e| ApiError::Upstream(format!("Unreadable geocoder response: {}", e)))?;

    Ok(AxumJson(resolve(data)))
}

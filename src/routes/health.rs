use axum::Json;
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(HealthResponse {
        status: "healthy",
        time,
        version: env!("CARGO_PKG_VERSION"),
    })
}

//! Health check endpoint.
use axum::Json;
use serde::Serialize;

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Report {
    pub status: Status,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
}

/// Handles `GET /health_check`. Answering at all is the health signal.
pub async fn handle_health_check() -> Json<Report> {
    Json(Report { status: Status::Ok })
}

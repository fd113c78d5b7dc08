use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::analysis::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(controller::submit))
        .route("/api/formats", get(controller::supported_formats))
}

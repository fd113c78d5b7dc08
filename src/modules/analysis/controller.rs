use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::modules::analysis::{
    intake::{self, IntakeError},
    model::{IncomingFile, Selection, MAX_IMAGES},
    normalizer,
    schema::{AnalysisData, ApiResponse, FormatsResponse},
    stats, unifier,
};
use crate::AppState;

type Failure = (StatusCode, Json<ApiResponse>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (status, Json(ApiResponse::failure(message, None)))
}

fn intake_failure(e: IntakeError) -> Failure {
    failure(StatusCode::BAD_REQUEST, e.to_string())
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<IncomingFile>, Failure> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        failure(StatusCode::BAD_REQUEST, format!("Failed to read multipart: {}", e))
    })? {
        // Plain form fields carry no file name and are not part of the selection.
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(|e| {
            failure(StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
        })?;

        // Browsers send an unnamed, empty part for a file input left blank.
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        files.push(IncomingFile {
            file_name,
            content_type,
            bytes: data.to_vec(),
        });
    }

    Ok(files)
}

pub async fn submit(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ApiResponse>, Failure> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let selection = if content_type.starts_with("application/json") {
        let body = Bytes::from_request(request, &state).await.map_err(|e| {
            failure(StatusCode::BAD_REQUEST, format!("Failed to read body: {}", e))
        })?;
        Selection::Log(intake::parse_message_log(&body).map_err(intake_failure)?)
    } else if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state).await.map_err(|e| {
            failure(StatusCode::BAD_REQUEST, format!("Failed to read multipart: {}", e))
        })?;
        let files = read_files(multipart).await?;
        intake::classify(files).map_err(intake_failure)?
    } else {
        return Err(failure(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected application/json or multipart/form-data",
        ));
    };

    if let Selection::Images { notice: Some(notice), .. } = &selection {
        warn!(%notice, "Image batch truncated");
    }

    let analysis_request =
        unifier::unify(selection, state.sentiment.document()).map_err(intake_failure)?;
    let kind = analysis_request.kind();

    let raw = state.sentiment.analyze(analysis_request).await.map_err(|e| {
        error!(error = %e, details = %e.details(), "Sentiment analysis failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Error processing file", Some(e.details()))),
        )
    })?;

    let result = normalizer::normalize(&raw);
    info!(kind, verdict = result.verdict(), score = result.score, "Analysis complete");

    Ok(Json(ApiResponse::ok(AnalysisData {
        id: Uuid::new_v4().to_string(),
        result,
        percentages: stats::project(&result),
        analyzed_at: chrono::Utc::now().to_rfc3339(),
    })))
}

pub async fn supported_formats() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: intake::supported_image_formats(),
        max_images: MAX_IMAGES,
    })
}

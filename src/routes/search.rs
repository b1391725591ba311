use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{InputError, Pipeline, PipelineError};
use crate::models::{ErrorResponse, HealthResponse, SearchRequest};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        lexicon_version: state.pipeline.lexicon().version().map(str::to_string),
        timestamp: chrono::Utc::now(),
    })
}

/// Search endpoint
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "message": "günstige vegane Pizza am Lendplatz",
///   "language": "de"
/// }
/// ```
async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    let request_id = uuid::Uuid::new_v4();

    if let Err(errors) = req.validate() {
        tracing::info!("[{}] Validation failed for search request: {}", request_id, errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let hint = req.language_hint();
    tracing::info!(
        "[{}] Search request ({} chars, hint {:?})",
        request_id,
        req.message.chars().count(),
        hint
    );

    match state.pipeline.extract_and_rank(&req.message, hint).await {
        Ok(bundle) => {
            tracing::info!(
                "[{}] {:?}: {} results in {}",
                request_id,
                bundle.outcome,
                bundle.results.len(),
                bundle.language
            );
            HttpResponse::Ok().json(bundle)
        }
        Err(PipelineError::Input(e)) => {
            tracing::info!("[{}] Rejected message: {}", request_id, e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: input_error_code(&e).to_string(),
                message: e.to_string(),
                status_code: 400,
            })
        }
        Err(PipelineError::Gateway(e)) => {
            tracing::error!("[{}] Search failed: {}", request_id, e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Repository unavailable".to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
    }
}

fn input_error_code(error: &InputError) -> &'static str {
    match error {
        InputError::Empty => "empty_message",
        InputError::TooLong { .. } => "message_too_long",
    }
}

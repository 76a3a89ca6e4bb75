//! HTTP route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::planner::{ItineraryRequest, PlanError, RequestField, ValidationError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/airports", get(list_airports))
        .route("/itinerary", post(plan_itinerary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Itinerary Planner API is running.",
    })
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List every airport in the network, sorted by code.
async fn list_airports(State(state): State<AppState>) -> Json<Vec<AirportResult>> {
    let mut airports: Vec<_> = state.network.airports().collect();
    airports.sort_by_key(|a| a.code);

    let results = airports
        .into_iter()
        .map(|a| AirportResult::from_airport(a, state.validator.is_allowed_origin(&a.code)))
        .collect();

    Json(results)
}

/// Plan an itinerary.
///
/// Validation runs inline; the search itself is CPU-bound and runs on the
/// blocking pool.
async fn plan_itinerary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ItineraryResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: ItineraryRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(body = %String::from_utf8_lossy(&body), "invalid itinerary request JSON: {e}");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
            field: None,
        }
    })?;

    let request = state.planner().validate(&req)?;

    if let Some(outcome) = state.cache.get(&request).await {
        debug!(start = %request.start, targets = request.targets.len(), "itinerary cache hit");
        return Ok(Json(ItineraryResponse::from_outcome(&outcome)));
    }

    let worker = state.clone();
    let search_request = request.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        worker.planner().plan_validated(&search_request)
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Planner task failed: {e}"),
    })??;

    let outcome = Arc::new(outcome);
    if state.cache.insert(request, outcome.clone()).await {
        debug!(entries = state.cache.entry_count(), "cached itinerary");
    }

    Ok(Json(ItineraryResponse::from_outcome(&outcome)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        field: Option<RequestField>,
    },
    NoRoute {
        message: String,
    },
    Internal {
        message: String,
    },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
            field: Some(e.field),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Validation(e) => e.into(),
            PlanError::NoFeasibleRoute(e) => AppError::NoRoute {
                message: e.to_string(),
            },
            PlanError::Assembly(e) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::BadRequest { message, field } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    kind: ErrorKind::InvalidRequest,
                    field,
                },
            ),
            AppError::NoRoute { message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: message,
                    kind: ErrorKind::NoRoute,
                    field: None,
                },
            ),
            AppError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    kind: ErrorKind::Internal,
                    field: None,
                },
            ),
        };

        if status.is_server_error() {
            error!("[{status}] {}", body.error);
        } else {
            info!("[{status}] {}", body.error);
        }

        (status, Json(body)).into_response()
    }
}

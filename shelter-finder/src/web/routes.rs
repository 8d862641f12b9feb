//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::catalog::CatalogError;
use crate::ranking::RankingError;
use crate::routing::{ComputeRouteRequest, RouteBackend, RouteError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/best-shelter", post(best_shelter))
        .route("/compute-route", post(compute_route))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        agent: state.agent.status(),
        agent_model: state.agent.handle().map(|h| h.model.clone()),
        routes_configured: state.routes.is_some(),
    })
}

/// Pick the best shelter for an origin.
async fn best_shelter(
    State(state): State<AppState>,
    Json(req): Json<BestShelterRequest>,
) -> Result<Json<BestShelterResponse>, AppError> {
    let explicit = req.shelters.unwrap_or_default();
    let catalog = state.catalog.clone();
    let shelters = tokio::task::spawn_blocking(move || catalog.resolve(explicit))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("catalog task failed: {e}"),
        })??;

    let outcome = state.ranker.select_best(req.origin, &shelters).await?;
    info!(
        origin = %req.origin,
        candidates = shelters.len(),
        shelter = %outcome.best.name,
        "best shelter chosen"
    );

    Ok(Json(BestShelterResponse {
        best: outcome.into(),
    }))
}

/// Compute a driving route through Google Routes.
///
/// Without a Maps API key, and when Google refuses the request, the answer is
/// a 200 carrying `{error}`, which route clients treat as final. Upstream
/// failures are a 502, which they retry.
async fn compute_route(
    State(state): State<AppState>,
    Json(req): Json<ComputeRouteRequest>,
) -> Result<Response, AppError> {
    let Some(backend) = state.routes.as_deref() else {
        return Ok(error_body("GOOGLE_MAPS_API_KEY not configured"));
    };

    for (which, point) in [("origin", req.origin), ("destination", req.destination)] {
        point.validate().map_err(|e| AppError::BadRequest {
            message: format!("invalid {which}: {e}"),
        })?;
    }

    match backend.request_route(req.origin, req.destination).await {
        Ok(route) => Ok(Json(route).into_response()),
        Err(RouteError::Rejected(message)) => {
            warn!(origin = %req.origin, destination = %req.destination, %message, "route refused");
            Ok(error_body(message))
        }
        Err(e) => Err(e.into()),
    }
}

fn error_body(message: impl Into<String>) -> Response {
    Json(ErrorResponse {
        error: message.into(),
    })
    .into_response()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<RankingError> for AppError {
    fn from(e: RankingError) -> Self {
        match e {
            RankingError::NoCandidates => AppError::NotFound {
                message: e.to_string(),
            },
            RankingError::InvalidOrigin(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::InvalidInput { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(status = status.as_u16(), %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

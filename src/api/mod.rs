use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::core::EngineTables;
use crate::error::{EngineError, EngineResult};
use crate::explain::{Explainer, GeminiExplainer};

mod budget;
mod investment;
mod mandi;
mod policy;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<EngineTables>,
    pub explainer: Arc<dyn Explainer>,
    pub default_inflation_rate: f64,
    pub market_seed: u64,
}

impl AppState {
    /// Fails when `tables` carries a malformed tax schedule.
    pub fn new(tables: EngineTables, explainer: Arc<dyn Explainer>) -> EngineResult<Self> {
        tables.tax.validate()?;
        let defaults = Settings::default();
        Ok(Self {
            tables: Arc::new(tables),
            explainer,
            default_inflation_rate: defaults.default_inflation_rate,
            market_seed: defaults.market_seed,
        })
    }

    pub fn from_settings(settings: &Settings) -> reqwest::Result<Self> {
        let explainer = GeminiExplainer::new(
            settings.gemini_api_url.clone(),
            settings.gemini_api_key.clone(),
            settings.explain_timeout(),
        )?;
        Ok(Self {
            tables: Arc::new(EngineTables::default()),
            explainer: Arc::new(explainer),
            default_inflation_rate: settings.default_inflation_rate,
            market_seed: settings.market_seed,
        })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::InvalidParameter { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::UnsupportedCategory { .. }) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        error_response(status, &self.to_string())
    }
}

type ApiResult = Result<Response, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// An engine result with the explanation text appended.
#[derive(Debug, Serialize)]
struct Explained<T> {
    #[serde(flatten)]
    result: T,
    ai_explanation: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/investment/simulate", post(investment::simulate_handler))
        .route("/api/investment/insurance", post(investment::insurance_handler))
        .route("/api/policy/simulate-tax", post(policy::tax_handler))
        .route("/api/policy/simulate-gst", post(policy::gst_handler))
        .route("/api/policy/simulate-subsidy", post(policy::subsidy_handler))
        .route(
            "/api/policy/simulate-import-duty",
            post(policy::import_duty_handler),
        )
        .route(
            "/api/policy/simulate-tax-rate-change",
            post(policy::tax_rate_change_handler),
        )
        .route(
            "/api/policy/simulate-sector-subsidy",
            post(policy::sector_subsidy_handler),
        )
        .route("/api/policy/compare-scenarios", post(policy::compare_handler))
        .route("/api/policy/tax-slabs", get(policy::tax_slabs_handler))
        .route("/api/budget/analyze", post(budget::analyze_handler))
        .route("/api/budget/optimize", post(budget::optimize_handler))
        .route("/api/coach/analyze", post(budget::coach_handler))
        .route("/api/mandi/prices", post(mandi::prices_handler))
        .route("/api/mandi/best-market", post(mandi::best_market_handler))
        .route("/api/mandi/msp-rates", get(mandi::msp_rates_handler))
        .route("/api/mandi/crops", get(mandi::crops_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin.trim() == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

pub async fn run_http_server(settings: &Settings, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let app = create_router(state, &settings.cors_origins);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "paisa HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn explained<T: Serialize>(result: T, ai_explanation: String) -> Response {
    json_response(
        StatusCode::OK,
        Explained {
            result,
            ai_explanation,
        },
    )
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    field: &str,
    min: T,
    max: T,
) -> Result<T, ApiError> {
    if value < min || value > max {
        return Err(ApiError::BadRequest(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(value)
}

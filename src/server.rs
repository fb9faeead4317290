//! JSON HTTP server.
//!
//! A thin pass-through over [`DisclosureLookup`]. Lookups touch the
//! filesystem synchronously, so each one runs on tokio's blocking pool.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/resolve` | Which record a company name resolves to |
//! | `POST` | `/search` | Resolve, load and process a record |
//! | `POST` | `/company_data` | Like `/search`, exact or substring matches only |
//!
//! Request bodies that are not JSON, or that lack or mistype a field, are
//! rejected with `bad_request`.
//! | `POST` | `/company_reports` | Every period with a matching record |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no record found for '카카오' in 2025Q1" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `missing_data` (422),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use dartdex_core::resolve::Resolution;
use dartdex_core::store::RecordStore;
use dartdex_core::{LookupError, Period};

use crate::config::Config;
use crate::lookup::{DisclosureLookup, LoadedDisclosure};

type SharedLookup = Arc<DisclosureLookup<Arc<dyn RecordStore>>>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    lookup: SharedLookup,
}

/// Binds to `[server].bind` and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        data = %config.data.base_path.display(),
        "dartdex server listening"
    );
    serve(listener, config).await
}

/// Serves on an already-bound listener.
pub async fn serve(listener: TcpListener, config: &Config) -> anyhow::Result<()> {
    let lookup = Arc::new(DisclosureLookup::from_config(config));
    axum::serve(listener, router(lookup)).await?;
    Ok(())
}

fn router(lookup: SharedLookup) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/resolve", post(handle_resolve))
        .route("/search", post(handle_search))
        .route("/company_data", post(handle_company_data))
        .route("/company_reports", post(handle_company_reports))
        .layer(cors)
        .with_state(AppState { lookup })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        let (status, code) = match &err {
            LookupError::InvalidQuery { .. } | LookupError::InvalidPeriod { .. } => {
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            LookupError::PathNotFound { .. } | LookupError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            LookupError::MissingData { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "missing_data"),
            LookupError::Io { .. } | LookupError::Json { .. } => {
                tracing::warn!(error = %err, "lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

/// Runs a lookup on the blocking pool.
async fn blocking<T, F>(state: AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&DisclosureLookup<Arc<dyn RecordStore>>) -> Result<T, LookupError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state.lookup))
        .await
        .map_err(|e| internal(format!("lookup task failed: {}", e)))?
        .map_err(AppError::from)
}

// ============ Requests ============

#[derive(Debug, Deserialize)]
struct CompanyQuery {
    company_name: String,
    year: i32,
    quarter: u8,
}

#[derive(Debug, Deserialize)]
struct ReportsQuery {
    company_name: String,
    /// Period to flag in the listing, e.g. `"2025Q1"`.
    #[serde(default)]
    target: Option<String>,
}

/// Decodes a request body, reporting malformed JSON and missing or
/// mistyped fields as `bad_request`.
fn parse_body<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|e| bad_request(e.body_text()))?;
    serde_json::from_value(value).map_err(|e| bad_request(format!("invalid request body: {}", e)))
}

fn disclosure_json(loaded: &LoadedDisclosure) -> Value {
    json!({
        "period": loaded.period.to_string(),
        "company_name": loaded.company_name(),
        "file_name": loaded.entry.file_name,
        "report": loaded.processed.to_json(),
        "markdown": loaded.processed.to_markdown(),
    })
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `200` with `"tier": "not_found"` when nothing matches; errors only for
/// bad input or a missing period.
async fn handle_resolve(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req: CompanyQuery = parse_body(body)?;
    let resolution = blocking(state, move |lookup| {
        lookup.resolve(&req.company_name, req.year, req.quarter)
    })
    .await?;
    Ok(Json(json!({ "resolution": resolution })))
}

async fn handle_search(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req: CompanyQuery = parse_body(body)?;
    let resolution = blocking(state, move |lookup| {
        let period = Period::new(req.year, req.quarter)?;
        let resolution = lookup.find_and_load(&req.company_name, req.year, req.quarter)?;
        match resolution {
            Resolution::NotFound { query } => Err(LookupError::not_found(query, Some(period))),
            found => Ok(found),
        }
    })
    .await?;

    let mut body = json!({ "tier": resolution.tier() });
    match &resolution {
        Resolution::Partial { matched_name, .. } => {
            body["matched_name"] = json!(matched_name);
        }
        Resolution::Fuzzy {
            score,
            alternatives,
            ..
        } => {
            body["score"] = json!(score);
            body["alternatives"] = json!(alternatives);
        }
        _ => {}
    }
    if let Some(loaded) = resolution.record() {
        body["data"] = disclosure_json(loaded);
    }
    Ok(Json(body))
}

async fn handle_company_data(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req: CompanyQuery = parse_body(body)?;
    let resolution = blocking(state, move |lookup| {
        lookup.company_data(&req.company_name, req.year, req.quarter)
    })
    .await?;
    let mut body = json!({ "tier": resolution.tier() });
    if let Some(loaded) = resolution.record() {
        body["data"] = disclosure_json(loaded);
    }
    Ok(Json(body))
}

async fn handle_company_reports(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req: ReportsQuery = parse_body(body)?;
    let listing = blocking(state, move |lookup| {
        let target = req.target.as_deref().map(str::parse::<Period>).transpose()?;
        lookup.quarterly_reports(&req.company_name, target)
    })
    .await?;
    Ok(Json(json!(listing)))
}

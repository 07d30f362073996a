//! HTTP route handlers.

use std::path::Path;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::catalog::SourceError;
use crate::lookup::{LookupError, parse_radius};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// Anything that is not an API route is served from `static_dir`.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations_in_range", get(stations_in_range))
        .route("/api/prices", get(prices))
        .route("/api/admin/refresh", post(refresh_catalog))
        .route("/api/admin/invalidate_results", post(invalidate_results))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint. Never loads the catalog.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.lookup.catalog().current().await;
    Json(HealthResponse::new(snapshot.as_deref()))
}

/// Stations within `distance` km of `suburb`, nearest first.
async fn stations_in_range(
    State(state): State<AppState>,
    Query(req): Query<StationsInRangeRequest>,
) -> Result<Json<Vec<StationEntry>>, AppError> {
    let place = req.suburb.as_deref().unwrap_or_default();
    let radius_km = parse_radius(req.distance.as_deref())?;

    let result = state
        .lookup
        .stations_in_range(place, req.postcode.as_deref(), radius_km)
        .await?;

    let entries = result
        .stations()
        .iter()
        .map(StationEntry::from_match)
        .collect();
    Ok(Json(entries))
}

/// Latest price for every station, located or not. Not cached.
async fn prices(State(state): State<AppState>) -> Result<Json<Vec<PriceEntry>>, AppError> {
    let records = state.prices.latest_prices().await?;
    Ok(Json(records.into_iter().map(PriceEntry::from_record).collect()))
}

/// Reload the station catalog from the backing store.
///
/// Memoized lookup results are left alone.
async fn refresh_catalog(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    let snapshot = state.lookup.refresh_catalog().await?;
    info!(records = snapshot.len(), "station catalog refreshed on request");
    Ok(Json(RefreshResponse {
        records: snapshot.len(),
    }))
}

/// Drop every memoized lookup result.
async fn invalidate_results(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let invalidated = state.lookup.invalidate_results().await;
    Json(InvalidateResponse { invalidated })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
    },
    /// An expected "no such place" outcome, reported with status 200.
    GeocodeFailed {
        message: String,
        suggestion: Option<String>,
    },
    Unavailable {
        message: String,
    },
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::InvalidRequest(message) => AppError::BadRequest { message },
            LookupError::GeocodeFailed { ref suggestion, .. } => AppError::GeocodeFailed {
                suggestion: suggestion.clone(),
                message: e.to_string(),
            },
            LookupError::CatalogUnavailable(source) => source.into(),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, suggestion) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "bad request");
                (StatusCode::BAD_REQUEST, message, None)
            }
            AppError::GeocodeFailed {
                message,
                suggestion,
            } => (StatusCode::OK, message, suggestion),
            AppError::Unavailable { message } => {
                error!(%message, "backing store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, message, None)
            }
        };

        let body = Json(ErrorResponse { error, suggestion });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use serde_json::{Value, json};
    use tempfile::{TempDir, tempdir};
    use tower::ServiceExt;

    use super::*;
    use crate::cache::ResultCache;
    use crate::catalog::StationCatalog;
    use crate::domain::record;
    use crate::geocode::{GeocodeCache, GeocodeCacheConfig};
    use crate::lookup::LookupService;
    use crate::testing::{FakeGeocoder, FakeSource, MemoryStore, candidate};

    struct TestApp {
        router: Router,
        source: Arc<FakeSource>,
        _static_dir: TempDir,
    }

    fn app() -> TestApp {
        let geocoder = FakeGeocoder::new().with_answer(
            "camberwell, Australia",
            vec![candidate(-37.8421, 145.0694, "Camberwell, Victoria, Australia")],
        );
        let source = Arc::new(FakeSource::new(vec![
            record("Near", "-37.8286", "145.0694", "2025-07-01 08:00:00"),
            record("Unlocated", "unknown", "145.0694", "2025-07-01 08:00:00"),
        ]));

        let geocodes = Arc::new(GeocodeCache::new(
            Arc::new(MemoryStore::new()),
            Arc::new(geocoder),
            GeocodeCacheConfig::default(),
        ));
        let catalog = Arc::new(StationCatalog::new(source.clone()));
        let lookup = LookupService::new(geocodes, catalog, Arc::new(ResultCache::new()));
        let state = AppState::new(lookup, source.clone());

        let static_dir = tempdir().unwrap();
        std::fs::write(static_dir.path().join("index.html"), "<h1>fuel</h1>").unwrap();

        TestApp {
            router: create_router(state, static_dir.path()),
            source,
            _static_dir: static_dir,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn stations_in_range_returns_entries() {
        let app = app();

        let (status, body) = send(
            &app.router,
            Method::GET,
            "/api/stations_in_range?suburb=Camberwell&distance=2",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["station"], "Near");
        assert_eq!(entries[0]["distance_km"], 1.5);
        assert_eq!(entries[0]["lat"], -37.8286);
        assert!(
            entries[0]["gmaps_url"]
                .as_str()
                .unwrap()
                .starts_with("https://www.google.com/maps/dir/?api=1&origin=-37.8421,145.0694")
        );
    }

    #[tokio::test]
    async fn unknown_suburb_is_ok_with_error_body() {
        let app = app();

        let (status, body) = send(
            &app.router,
            Method::GET,
            "/api/stations_in_range?suburb=Atlantis&distance=5",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "Could not geocode suburb: Atlantis"}));
    }

    #[tokio::test]
    async fn missing_or_bad_parameters_are_bad_requests() {
        let app = app();

        for uri in [
            "/api/stations_in_range?distance=5",
            "/api/stations_in_range?suburb=&distance=5",
            "/api/stations_in_range?suburb=Camberwell",
            "/api/stations_in_range?suburb=Camberwell&distance=far",
            "/api/stations_in_range?suburb=Camberwell&distance=-2",
        ] {
            let (status, body) = send(&app.router, Method::GET, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
            assert!(body.get("suggestion").is_none(), "{uri}");
        }
    }

    #[tokio::test]
    async fn catalog_failure_is_service_unavailable() {
        let app = app();
        app.source.set_failing(true);

        let (status, body) = send(
            &app.router,
            Method::GET,
            "/api/stations_in_range?suburb=Camberwell&distance=2",
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn health_reports_catalog_state() {
        let app = app();

        let (status, body) = send(&app.router, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["catalog_records"], Value::Null);

        send(
            &app.router,
            Method::GET,
            "/api/stations_in_range?suburb=Camberwell&distance=2",
        )
        .await;

        let (_, body) = send(&app.router, Method::GET, "/health").await;
        assert_eq!(body["catalog_records"], 2);
        assert!(body["catalog_loaded_at"].is_string());
    }

    #[tokio::test]
    async fn refresh_keeps_cached_results_until_invalidated() {
        let app = app();
        let uri = "/api/stations_in_range?suburb=Camberwell&distance=2";

        let (_, before) = send(&app.router, Method::GET, uri).await;

        app.source.set_records(vec![record(
            "Replacement",
            "-37.8421",
            "145.0694",
            "2025-07-02 08:00:00",
        )]);
        let (status, body) = send(&app.router, Method::POST, "/api/admin/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"records": 1}));

        let (_, after_refresh) = send(&app.router, Method::GET, uri).await;
        assert_eq!(after_refresh, before);

        let (status, body) =
            send(&app.router, Method::POST, "/api/admin/invalidate_results").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"invalidated": 1}));

        let (_, after_invalidate) = send(&app.router, Method::GET, uri).await;
        assert_eq!(after_invalidate[0]["station"], "Replacement");
    }

    #[tokio::test]
    async fn failed_refresh_is_service_unavailable() {
        let app = app();
        app.source.set_failing(true);

        let (status, _) = send(&app.router, Method::POST, "/api/admin/refresh").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn prices_lists_every_station() {
        let app = app();

        let (status, body) = send(&app.router, Method::GET, "/api/prices").await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["lat"], Value::Null);
    }

    #[tokio::test]
    async fn static_files_are_served_as_fallback() {
        let app = app();

        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>fuel</h1>");
    }
}

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use fuel_server::cache::ResultCache;
use fuel_server::catalog::{SqliteStationSource, StationCatalog};
use fuel_server::config::AppConfig;
use fuel_server::geocode::{GeocodeCache, JsonFileStore, NominatimClient};
use fuel_server::lookup::LookupService;
use fuel_server::web::{AppState, create_router};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "fuel_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env();
    info!(?config, "starting fuel server");

    // Geocoding: Nominatim behind the on-disk cache
    let geocoder =
        NominatimClient::new(config.nominatim.clone()).expect("Failed to create geocoder client");
    let geocodes = GeocodeCache::new(
        Arc::new(JsonFileStore::new(&config.geocode_cache_path)),
        Arc::new(geocoder),
        config.geocode.clone(),
    );

    // Station catalog, loaded on first lookup
    let source = Arc::new(SqliteStationSource::new(&config.db_path));
    let catalog = StationCatalog::new(source.clone());

    let lookup = LookupService::new(
        Arc::new(geocodes),
        Arc::new(catalog),
        Arc::new(ResultCache::new()),
    );
    let state = AppState::new(lookup, source);

    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listen address");
    info!(addr = %config.bind_addr, "listening");
    info!("  GET  /health");
    info!("  GET  /api/stations_in_range?suburb=&postcode=&distance=");
    info!("  GET  /api/prices");
    info!("  POST /api/admin/refresh");
    info!("  POST /api/admin/invalidate_results");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("received shutdown signal, shutting down");
}

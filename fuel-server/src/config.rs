//! Process configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::geocode::{GeocodeCacheConfig, NominatimConfig};

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000);
const DEFAULT_DB_PATH: &str = "data/history.db";
const DEFAULT_GEOCODE_CACHE: &str = "data/geocode_cache.json";
const DEFAULT_STATIC_DIR: &str = "frontend";

/// Headroom the geocode cache allows on top of the HTTP client's own timeout.
const LOOKUP_TIMEOUT_SLACK: Duration = Duration::from_secs(2);

/// Everything `main` needs to wire up the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// SQLite database holding `petrol_prices`
    pub db_path: PathBuf,
    /// JSON file backing the geocode cache
    pub geocode_cache_path: PathBuf,
    /// Directory of static frontend files
    pub static_dir: PathBuf,
    pub nominatim: NominatimConfig,
    pub geocode: GeocodeCacheConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// Every variable is optional. Values that fail to parse are logged and
    /// replaced by their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parsed(get("FUEL_BIND_ADDR"), "FUEL_BIND_ADDR", DEFAULT_BIND_ADDR);

        let mut nominatim = NominatimConfig::new();
        if let Some(url) = get("NOMINATIM_URL") {
            nominatim = nominatim.with_base_url(url);
        }
        if let Some(agent) = get("NOMINATIM_USER_AGENT") {
            nominatim = nominatim.with_user_agent(agent);
        }
        let timeout_secs = parsed(
            get("GEOCODE_TIMEOUT_SECS"),
            "GEOCODE_TIMEOUT_SECS",
            nominatim.timeout_secs,
        );
        nominatim = nominatim.with_timeout(timeout_secs);

        let mut geocode = GeocodeCacheConfig {
            lookup_timeout: Duration::from_secs(timeout_secs) + LOOKUP_TIMEOUT_SLACK,
            ..GeocodeCacheConfig::default()
        };
        if let Some(country) = get("GEOCODE_COUNTRY") {
            geocode.country = country.trim().to_string();
        }

        Self {
            bind_addr,
            db_path: get("FUEL_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            geocode_cache_path: get("FUEL_GEOCODE_CACHE")
                .unwrap_or_else(|| DEFAULT_GEOCODE_CACHE.to_string())
                .into(),
            static_dir: get("FUEL_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            nominatim,
            geocode,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Parse `raw`, falling back to `default` (with a warning) when it is
/// absent or malformed.
fn parsed<T: FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "invalid configuration value, using default");
            default
        }
    }
}

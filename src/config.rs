use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_FILE: &str = "catalog.json";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 100;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// JSON snapshot the CLI reads the catalog from and writes it back to.
pub fn get_data_file() -> PathBuf {
    env::var("CATALOG_DATA_FILE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
        .into()
}

/// Optional seed file used to populate an empty catalog.
pub fn get_seed_file() -> Option<PathBuf> {
    env::var("CATALOG_SEED_FILE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn get_cache_ttl() -> Duration {
    Duration::from_secs(parse_positive(
        env::var("CATALOG_CACHE_TTL_SECS").ok().as_deref(),
        DEFAULT_CACHE_TTL_SECS,
    ))
}

pub fn get_import_batch_size() -> usize {
    parse_positive(env::var("IMPORT_BATCH_SIZE").ok().as_deref(), DEFAULT_IMPORT_BATCH_SIZE as u64) as usize
}

/// Parse a strictly positive integer, falling back to `default` otherwise.
pub fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

pub mod catalog;
pub mod system;

use std::path::PathBuf;

use srvcat::store::InMemoryCatalogStore;
use srvcat::CatalogService;

/// Shared state for the JSON API and the CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    /// The concrete store behind `catalog`, kept for snapshotting.
    pub store: InMemoryCatalogStore,
    pub data_file: PathBuf,
}

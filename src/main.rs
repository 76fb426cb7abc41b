mod handlers;
mod routes;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use srvcat::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use srvcat::filters::RawQuery;
use srvcat::import::{import_file, load_seed_file, seed_catalog, ImportOptions, ImportProgress, ImportSummary};
use srvcat::store::{load_snapshot, save_snapshot, InMemoryCatalogStore};
use srvcat::{CatalogService, QueryResult};

use handlers::AppState;

/// Build the shared state: load the snapshot, or seed an empty catalog when
/// a seed file is configured.
fn build_state_from_env(env_file: Option<&str>) -> AppState {
    config::load_env_file(env_file);
    let data_file = config::get_data_file();

    let store = match load_snapshot(&data_file) {
        Ok(Some(snapshot)) => match InMemoryCatalogStore::from_snapshot(snapshot) {
            Ok(store) => store,
            Err(e) => fail(&format!("Invalid catalog snapshot {}", data_file.display()), &e),
        },
        Ok(None) => InMemoryCatalogStore::new(),
        Err(e) => fail(&format!("Failed to read catalog snapshot {}", data_file.display()), &e),
    };
    let catalog = CatalogService::new(Arc::new(store.clone()), config::get_cache_ttl());

    if catalog.is_empty() {
        if let Some(seed_file) = config::get_seed_file() {
            match load_seed_file(&seed_file) {
                Ok(entries) => {
                    let summary = seed_catalog(&catalog, entries, config::get_import_batch_size());
                    tracing::info!(created = summary.created, seed = %seed_file.display(), "Seeded empty catalog");
                }
                Err(e) => tracing::error!(%e, seed = %seed_file.display(), "Failed to load seed file"),
            }
        }
    }

    AppState { catalog, store, data_file }
}

fn fail(context: &str, err: &dyn std::fmt::Display) -> ! {
    tracing::error!(%err, "{}", context);
    eprintln!("{}: {}", yansi::Paint::new(context).red(), err);
    process::exit(1);
}

fn persist(state: &AppState) {
    if let Err(e) = save_snapshot(&state.data_file, &state.store.snapshot()) {
        fail(&format!("Failed to write {}", state.data_file.display()), &e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "Failed to listen for shutdown signal");
    }
}

async fn start_server(state: AppState, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => fail("Invalid host/port format", &e),
    };
    let records = state.catalog.len();
    let app = routes::build_router(state);
    tracing::info!(%addr, records, "Starting catalog API server");
    println!(
        "{} {}",
        yansi::Paint::new("Catalog API running on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
                fail("Server error", &e);
            }
        }
        Err(e) => {
            eprintln!(
                "{}\n{}",
                yansi::Paint::new(format!("Failed to bind to {}: {}", addr, e)).red(),
                yansi::Paint::new("Stop any process using this port, or pass a different --port value.").yellow()
            );
            process::exit(1);
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

fn print_query_result(result: &QueryResult) {
    if result.is_empty() {
        println!("(no matching servers)");
    } else {
        let mut table = new_table();
        table.set_header(vec!["ID", "Model", "RAM", "Storage", "Disk", "Location", "Price"]);
        for r in &result.data {
            table.add_row(vec![
                r.id.to_string(),
                r.model.clone(),
                format!("{} GB", r.ram_size_gb),
                format!("{} GB ({})", r.storage_total_gb, r.storage_raw),
                r.disk_type.to_string(),
                r.location.clone(),
                r.display_price(),
            ]);
        }
        println!("\n{table}");
    }
    let p = &result.pagination;
    println!(
        "Page {} of {} ({} matching servers)\n",
        p.page,
        p.total_pages.max(1),
        p.total
    );
}

fn print_import_summary(summary: &ImportSummary, path: &Path) {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["File".to_string(), path.display().to_string()]);
    table.add_row(vec!["Rows read".to_string(), summary.rows_read.to_string()]);
    table.add_row(vec!["Created".to_string(), summary.created.to_string()]);
    table.add_row(vec!["Updated".to_string(), summary.updated.to_string()]);
    table.add_row(vec!["Skipped".to_string(), summary.skipped.to_string()]);
    table.add_row(vec!["Errors".to_string(), summary.errors.len().to_string()]);
    table.add_row(vec!["Batches".to_string(), summary.batches.to_string()]);
    table.add_row(vec!["Duration".to_string(), format!("{} ms", summary.duration_ms)]);
    println!("\n{table}");

    if !summary.errors.is_empty() {
        println!("{}", yansi::Paint::new("Row errors:").yellow().bold());
        for err in &summary.errors {
            println!("  {}", err);
        }
    }
    if summary.dry_run {
        println!("{}", yansi::Paint::new("Dry run: no changes were saved.").yellow());
    }
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    match ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} rows {msg}") {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => tracing::debug!(%e, "Falling back to default progress style"),
    }
    pb
}

#[derive(Parser)]
#[command(
    name = "srvcat",
    author,
    version,
    about = "Dedicated server catalog: spreadsheet import and filtered queries",
    long_about = r#"srvcat keeps a catalog of dedicated-server listings imported from spreadsheets.

Raw RAM, storage and price text is normalised on import (e.g. `16GBDDR3`, `2x2TBSATA2`,
`S$565.99`), and the catalog is served through filtered, sorted and paginated queries.

Examples:
  1) Import a sheet (re-running it updates existing rows instead of duplicating them):
      srvcat import servers.xlsx
  2) Preview an import without saving:
      srvcat import servers.csv --dry-run
  3) Query from the terminal:
      srvcat query --ram 16GB --ram 32GB --storage 1TB-2TB --sort price
  4) Serve the JSON API:
      srvcat serve --port 8080
"#,
    after_help = "Use `srvcat <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
    #[command(about = "Import a CSV or spreadsheet file", long_about = "Import listings from a .csv, .xlsx, .xlsm, .xls or .ods file. Rows are matched to existing listings by model, location and storage text; matches are updated in place. Blank rows are skipped and malformed rows are reported without stopping the import.")]
    Import {
        file: PathBuf,
        /// Rows per write batch (default: IMPORT_BATCH_SIZE or 100)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Parse and count without saving anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long)]
        env_file: Option<String>,
    },
    #[command(about = "Load a JSON seed file", long_about = "Apply a JSON seed file (an array of {model, ram, hdd, location, price} entries) to the catalog. Defaults to CATALOG_SEED_FILE.")]
    Seed {
        file: Option<PathBuf>,
        #[arg(long)]
        env_file: Option<String>,
    },
    #[command(about = "Query the catalog", long_about = "Run a filtered query. Invalid filter values are ignored, exactly as the API does.")]
    Query {
        /// Storage bucket, e.g. 1TB-2TB (repeatable)
        #[arg(long)]
        storage: Vec<String>,
        /// RAM size, e.g. 16GB (repeatable)
        #[arg(long)]
        ram: Vec<String>,
        /// SAS, SATA or SSD
        #[arg(long)]
        disk_type: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        price_min: Option<String>,
        #[arg(long)]
        price_max: Option<String>,
        /// price, ram, storage or model
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(long, short = 'p')]
        page: Option<String>,
        #[arg(long)]
        limit: Option<String>,
        /// Print raw JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Show the available filter options
    Filters {
        #[arg(long, default_value_t = false)]
        json: bool,
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Validate configuration and the catalog snapshot
    CheckConfig {
        #[arg(long)]
        env_file: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    match cli.command {
        Commands::Serve { host, port, env_file } => {
            let state = build_state_from_env(env_file.as_deref());
            start_server(state, &host, port).await;
        }
        Commands::Import {
            file,
            batch_size,
            dry_run,
            env_file,
        } => {
            let state = build_state_from_env(env_file.as_deref());
            let options = ImportOptions {
                batch_size: batch_size.unwrap_or_else(config::get_import_batch_size),
                dry_run,
            };
            let pb = progress_bar();
            let bar = pb.clone();
            let catalog = state.catalog.clone();
            let source = file.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                import_file(&catalog, &source, options, &mut |p: &ImportProgress| {
                    if let Some(total) = p.total_estimate {
                        bar.set_length(total as u64);
                    }
                    bar.set_position(p.processed as u64);
                    bar.set_message(p.message.clone());
                })
            })
            .await;
            pb.finish_and_clear();

            match outcome {
                Ok(Ok(summary)) => {
                    if !summary.dry_run {
                        persist(&state);
                    }
                    print_import_summary(&summary, &file);
                }
                Ok(Err(e)) => fail("Import failed", &e),
                Err(e) => fail("Import task failed", &e),
            }
        }
        Commands::Seed { file, env_file } => {
            let state = build_state_from_env(env_file.as_deref());
            let Some(path) = file.or_else(config::get_seed_file) else {
                eprintln!("{}", yansi::Paint::new("No seed file given and CATALOG_SEED_FILE is not set").red());
                process::exit(1);
            };
            let entries = match load_seed_file(&path) {
                Ok(entries) => entries,
                Err(e) => fail(&format!("Failed to load seed file {}", path.display()), &e),
            };
            let summary = seed_catalog(&state.catalog, entries, config::get_import_batch_size());
            persist(&state);
            print_import_summary(&summary, &path);
        }
        Commands::Query {
            storage,
            ram,
            disk_type,
            location,
            price_min,
            price_max,
            sort,
            order,
            page,
            limit,
            json,
            env_file,
        } => {
            let state = build_state_from_env(env_file.as_deref());
            let raw = RawQuery {
                storage,
                ram,
                disk_type,
                location,
                price_min,
                price_max,
                sort,
                order,
                page,
                limit,
            };
            let (_, result) = state.catalog.search(&raw);
            if json {
                match serde_json::to_string_pretty(result.as_ref()) {
                    Ok(s) => println!("{}", s),
                    Err(e) => fail("Failed to encode result", &e),
                }
            } else {
                print_query_result(&result);
            }
        }
        Commands::Filters { json, env_file } => {
            let state = build_state_from_env(env_file.as_deref());
            let options = state.catalog.filter_options();
            if json {
                match serde_json::to_string_pretty(&options) {
                    Ok(s) => println!("{}", s),
                    Err(e) => fail("Failed to encode filter options", &e),
                }
                return;
            }
            let mut table = new_table();
            table.set_header(vec!["Filter", "Options"]);
            let ranges: Vec<String> = options.storage_ranges.iter().map(|r| r.label.clone()).collect();
            let rams: Vec<String> = options.ram_options.iter().map(|r| r.label.clone()).collect();
            table.add_row(vec!["storage".to_string(), ranges.join(", ")]);
            table.add_row(vec!["ram".to_string(), rams.join(", ")]);
            table.add_row(vec!["disk_type".to_string(), options.disk_types.join(", ")]);
            table.add_row(vec!["location".to_string(), options.locations.join(", ")]);
            println!("\n{table}\n");
        }
        Commands::CheckConfig { env_file } => {
            let state = build_state_from_env(env_file.as_deref());
            println!("{} {}", yansi::Paint::new("Data file:").bold(), state.data_file.display());
            match config::get_seed_file() {
                Some(seed) if !seed.exists() => {
                    eprintln!("{} {}", yansi::Paint::new("Seed file does not exist:").red(), seed.display());
                    process::exit(1);
                }
                Some(seed) => println!("{} {}", yansi::Paint::new("Seed file:").bold(), seed.display()),
                None => println!("{} (none)", yansi::Paint::new("Seed file:").bold()),
            }
            println!("{} {}s", yansi::Paint::new("Cache TTL:").bold(), config::get_cache_ttl().as_secs());
            println!("{} {}", yansi::Paint::new("Import batch size:").bold(), config::get_import_batch_size());
            println!(
                "{}",
                yansi::Paint::new(format!("Configuration looks valid ({} listings loaded)", state.catalog.len())).green()
            );
        }
    }
}

use std::{env, fs::OpenOptions, net::SocketAddr, path::Path, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use spendboard::{
    AppState, CsvTransactionStore, DashboardConfig, OverrideStore, PaginationConfig,
    SqliteTransactionStore, TransactionStore, build_router, graceful_shutdown,
};

/// The web server for the spendboard dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the base transaction data: either the sync process's
    /// SQLite database (.db/.sqlite) or a flat CSV file.
    #[arg(long)]
    base_path: String,

    /// File path to the override CSV file. Created on the first edit.
    #[arg(long)]
    overrides_path: String,

    /// Optional path to a JSON file with the dashboard configuration
    /// (owners, budgets, essential categories).
    #[arg(long)]
    config_path: Option<String>,

    /// The canonical timezone used for "today", e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let secret = env::var("SECRET_KEY").expect("The environment variable 'SECRET_KEY' must be set");
    let password = env::var("DASHBOARD_PASSWORD")
        .expect("The environment variable 'DASHBOARD_PASSWORD' must be set");

    let config = load_config(args.config_path.as_deref());
    let base_store = open_base_store(&args.base_path);
    let override_store = OverrideStore::new(&args.overrides_path);

    let state = AppState::new(
        &secret,
        &password,
        &args.timezone,
        config,
        PaginationConfig::default(),
        base_store,
        override_store,
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn load_config(config_path: Option<&str>) -> DashboardConfig {
    let Some(config_path) = config_path else {
        return DashboardConfig::default();
    };

    let contents = std::fs::read_to_string(config_path)
        .unwrap_or_else(|error| panic!("Could not read config file {config_path}: {error}"));

    serde_json::from_str(&contents)
        .unwrap_or_else(|error| panic!("Could not parse config file {config_path}: {error}"))
}

fn open_base_store(base_path: &str) -> Arc<dyn TransactionStore> {
    let extension = Path::new(base_path)
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();

    match extension {
        "db" | "sqlite" | "sqlite3" => {
            let store = SqliteTransactionStore::open(base_path)
                .unwrap_or_else(|error| panic!("Could not open {base_path}: {error}"));
            Arc::new(store)
        }
        _ => Arc::new(CsvTransactionStore::new(base_path)),
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}

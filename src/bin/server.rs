use std::{
    fs::OpenOptions,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, JsonFileStore, SQLiteExpenseStore, build_router, get_local_offset,
    graceful_shutdown, initialize_db, logging_middleware,
};

/// Where the expense collection is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Storage {
    /// A single pretty-printed JSON file.
    Json,
    /// A SQLite database with one row per expense.
    Sqlite,
}

/// The web server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The backend used to store expenses.
    #[arg(long, value_enum, default_value_t = Storage::Json)]
    storage: Storage,

    /// File path to the JSON file or SQLite database holding the expenses.
    #[arg(long, default_value = "expenses.json")]
    data_path: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The address to bind to.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    ///
    /// Used for the default date of new expenses.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The directory to serve static files from.
    #[arg(long, default_value = "static/")]
    static_dir: PathBuf,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!(
            "Could not open the log file {}: {error}",
            args.log_path.display()
        );
        return ExitCode::FAILURE;
    }

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!(
            "Invalid timezone {:?}, use a canonical timezone name such as \"Pacific/Auckland\"",
            args.timezone
        );
        return ExitCode::FAILURE;
    }

    let state = match open_store(args.storage, &args.data_path, &args.timezone) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(
                "Could not open the expense store at {}: {error}",
                args.data_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state, &args.static_dir)
        .layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!("HTTP server listening on http://{addr}");

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn open_store(
    storage: Storage,
    data_path: &Path,
    timezone: &str,
) -> Result<AppState, expense_tracker::Error> {
    let state = match storage {
        Storage::Json => {
            let store = JsonFileStore::open(data_path)?;
            tracing::info!("Storing expenses in the JSON file {}", data_path.display());
            AppState::new(store, timezone)
        }
        Storage::Sqlite => {
            let connection = Connection::open(data_path)?;
            initialize_db(&connection)?;
            tracing::info!(
                "Storing expenses in the SQLite database {}",
                data_path.display()
            );
            AppState::new(
                SQLiteExpenseStore::new(Arc::new(Mutex::new(connection))),
                timezone,
            )
        }
    };

    Ok(state)
}

fn setup_logging(log_path: &Path) -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
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
        // Errors are logged by the handlers, so disable the default 5xx logging
        .on_failure(());

    router.layer(tracing_layer)
}

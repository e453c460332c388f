mod args;
mod config;
mod dirs;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use http_api::HttpState;
use monitor_app::{AppConfig, AppPaths, AppState, CollectOutcome, ensure_app_data_dir};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        info!(
            "created config at {} (default port {})",
            config.paths.file.display(),
            config.config.port
        );
    }

    let data_dir = dirs::resolve_data_dir().map_err(io::Error::other)?;
    if data_dir.matched_existing {
        info!("using existing data dir: {}", data_dir.dir.display());
    }

    let paths = AppPaths::new(data_dir.dir);
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;

    let openclaw_home = args
        .home
        .clone()
        .unwrap_or_else(ingest::default_openclaw_home);
    info!("watching session logs under {}", openclaw_home.display());

    let app_state = AppState::new(AppConfig::new(openclaw_home, paths.cache_path));
    app_state.prime();

    if args.once {
        match app_state.collect() {
            CollectOutcome::Completed(summary) => {
                println!(
                    "{} calls, ${:.4} total ({} new records from {} files)",
                    summary.total_calls,
                    summary.total_cost,
                    summary.records_extracted,
                    summary.files_scanned
                );
            }
            CollectOutcome::Skipped => println!("refresh already in progress"),
        }
        return Ok(());
    }

    let router = http_api::router(HttpState::new(app_state.snapshot.clone()));

    let port = args.port.unwrap_or(config.config.port);
    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        warn!("configured port {port} was unavailable; using {actual_port} for this run");
    }

    println!("OpenClaw Usage Monitor is running at http://127.0.0.1:{actual_port}");
    println!("Press Ctrl+C to stop.");

    let interval = Duration::from_secs(config.config.refresh_minutes.max(1) * 60);
    spawn_refresh_loop(app_state, interval);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// First cycle runs right away (after the listener is bound), then one per
/// interval. Cycles run on the blocking pool; an overlapping tick is skipped
/// inside the collector.
fn spawn_refresh_loop(state: AppState, interval: Duration) {
    tokio::spawn(async move {
        loop {
            let cycle_state = state.clone();
            match tokio::task::spawn_blocking(move || cycle_state.collect()).await {
                Ok(_) => {}
                Err(err) => error!("refresh cycle panicked: {}", err),
            }
            tokio::time::sleep(interval).await;
        }
    });
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

use tmq_server::logger::{self, LogTarget};
use tmq_server::{AppState, Cli, ServerError, build_router};

use tmq_broker::HttpBrokerAdmin;
use tmq_config::Config;
use tmq_core::{Clock, SystemClock};
use tmq_db::{AlertRepository, NamespaceRepository};
use tmq_engine::{EngineSettings, LogAlertSink, Metrics, Scheduler, ShutdownCoordinator};

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    // .env is optional; TMQ_* variables may come from the environment directly
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    config.validate()?;

    let log_file_path = if let Some(ref filename) = config.logging.file {
        let log_dir = Config::config_dir()?.join(&config.logging.dir);
        std::fs::create_dir_all(&log_dir)?;
        Some(log_dir.join(filename))
    } else {
        None
    };
    logger::initialize(
        config.logging.level,
        LogTarget::from_config(log_file_path, config.logging.colored),
    )?;

    info!("Starting tmq-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let metrics_handle =
        PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| ServerError::Metrics {
                message: e.to_string(),
            })?;

    let database_path = config.database_path()?;
    info!("Opening database: {}", database_path.display());
    let pool = tmq_db::open(&database_path).await.map_err(ServerError::from)?;
    let store = Arc::new(NamespaceRepository::new(pool.clone()));
    let alerts = Arc::new(AlertRepository::new(pool));

    let broker = HttpBrokerAdmin::new(
        &config.broker.url,
        &config.broker.username,
        config.broker.password.as_deref().unwrap_or_default(),
        Duration::from_secs(config.broker.request_timeout_secs),
        config.broker.max_requests_per_second,
    )
    .map_err(ServerError::from)?;

    let settings = EngineSettings::from_config(&config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = Scheduler::new(
        store,
        alerts,
        Arc::new(broker),
        Arc::new(LogAlertSink),
        clock,
        settings,
        Metrics::new(),
    );

    if cli.once {
        return Ok(run_single_tick(&scheduler).await);
    }

    let shutdown = ShutdownCoordinator::new();

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;
    info!("Operator endpoints listening on {}", listener.local_addr()?);

    let app = build_router(AppState {
        scheduler: scheduler.clone(),
        metrics: metrics_handle,
    });

    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    // A tripped scheduler stops ticking but the endpoints stay up and report
    // 503 until an operator restarts the process.
    let shutdown_for_engine = shutdown.clone();
    let engine = tokio::spawn(async move {
        let result = scheduler.run(&shutdown_for_engine).await;
        if let Err(ref e) = result {
            error!("Scheduler halted: {}", e);
        }
        result
    });

    let mut guard = shutdown.subscribe_guard();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            guard.wait().await;
            info!("HTTP server shut down");
        })
        .await?;

    match engine.await {
        Ok(Ok(())) => Ok(ExitCode::SUCCESS),
        Ok(Err(_)) => Ok(ExitCode::FAILURE),
        Err(e) => {
            error!("Scheduler task panicked: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_single_tick(scheduler: &Scheduler) -> ExitCode {
    match scheduler.run_once().await {
        Ok(report) if report.is_failed() => {
            warn!(
                "Tick failed: {}",
                report
                    .tick_error
                    .as_deref()
                    .unwrap_or("too many operations failed")
            );
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Tick could not run: {}", e);
            ExitCode::FAILURE
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use carelink_server::{
    api::router,
    config::Settings,
    logging::{self, LogFormat},
    state::AppState,
    storage::CareDatabase,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init(LogFormat::from_env()) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let db_path = settings.database_path();
    let db = match CareDatabase::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, path = %db_path.display(), "Failed to open database");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(path = %db_path.display(), "Database opened");

    let state = AppState::new(db, settings.auth);
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %settings.bind_addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    tracing::info!(addr = %settings.bind_addr, "CareLink server listening (docs at /docs)");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await;

    match served {
        Ok(()) => {
            tracing::info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

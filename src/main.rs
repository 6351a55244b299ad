// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use safezone_vault::{
    api::router,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    crypto::CryptoEngine,
    state::AppState,
    storage::{DiskVault, StoragePaths},
};

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).compact())
            .init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let crypto = CryptoEngine::new(&config.encryption_key);
    if let Err(e) = crypto.self_test() {
        tracing::error!(error = %e, "Encryption self-test failed, refusing to start");
        return ExitCode::FAILURE;
    }

    let vault = match DiskVault::open(StoragePaths::new(&config.data_dir)) {
        Ok(vault) => vault,
        Err(e) => {
            tracing::error!(
                error = %e,
                data_dir = %config.data_dir.display(),
                "Failed to initialize storage"
            );
            return ExitCode::FAILURE;
        }
    };

    if !config.auth.is_production() {
        tracing::warn!("AUTH_JWT_SECRET not set: bearer tokens are NOT signature-checked");
    }

    let state = AppState::new(vault, crypto)
        .with_auth_config(config.auth.clone())
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = router(state);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let addr = config.bind_addr;
    let result = match config.tls {
        Some(tls) => {
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::warn!("rustls crypto provider already installed");
            }

            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load TLS certificate or key");
                    return ExitCode::FAILURE;
                }
            };

            let handle = Handle::new();
            let watcher = handle.clone();
            let token = shutdown.clone();
            tokio::spawn(async move {
                token.cancelled().await;
                watcher.graceful_shutdown(None);
            });

            tracing::info!(%addr, "Safezone Vault listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(error = %e, %addr, "Failed to bind");
                    return ExitCode::FAILURE;
                }
            };

            tracing::info!(%addr, "Safezone Vault listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        }
    };

    match result {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

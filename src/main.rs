// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use chatlogger_server::{
    api::router,
    auth::{
        api_key::{seed_api_key, SeededKey},
        InMemoryApiKeyStore,
    },
    config::{ConfigResolver, EnvFileStatus, ProcessEnv, RuntimeConfig},
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration; nothing is served with an invalid one
    let resolver = ConfigResolver::new();
    let config = match resolver.resolve(&ProcessEnv) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            // No subscriber yet, so both go straight to stderr
            if let Some(EnvFileStatus::Failed(env_error)) = resolver.env_file_status() {
                eprintln!("Failed to load .env file: {env_error}");
            }
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    telemetry::init(&config);
    if let Some(status) = resolver.env_file_status() {
        status.report();
    }
    tracing::info!(config = ?config, "Configuration loaded");

    let key_store = InMemoryApiKeyStore::new();
    match seed_api_key(&key_store, &ProcessEnv, &config).await {
        SeededKey::Configured(record) => tracing::info!(
            owner_id = %record.owner_id,
            organization_id = ?record.organization_id,
            "Seeded API key from SEED_API_KEY"
        ),
        SeededKey::Generated { key, record } => {
            tracing::info!(
                key_prefix = %key.key_prefix,
                owner_id = %record.owner_id,
                organization_id = ?record.organization_id,
                "Generated development API key"
            );
            // Shown once on stdout, never through the log pipeline
            println!("Development API key: {}", key.key);
        }
        SeededKey::Skipped => tracing::debug!("No API key seeded"),
    }

    let state = AppState::new(config.clone(), Arc::new(key_store));
    let app = router(state);

    match serve(&config, app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: &RuntimeConfig, app: axum::Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        docs = %format!("{}{}", config.base_url(), config.api_documentation_path()),
        environment = config.node_env(),
        "Chatlogger server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

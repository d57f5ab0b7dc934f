use faculty_eval::{bootstrap, create_db_pool, create_router, init_tracing, AppState, Config};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    info!(
        service = %config.telemetry.service_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting server"
    );

    for issue in config.validate_for_production() {
        warn!(issue = %issue, "Configuration warning");
    }

    info!(
        database_url = %config.database.url.split('@').next_back().unwrap_or("***"),
        max_connections = config.database.max_connections,
        "Connecting to database"
    );

    let db_pool = create_db_pool(&config).unwrap_or_else(|e| {
        error!(error = %e, "Failed to create database pool");
        std::process::exit(1);
    });

    info!("Database connection pool created");

    match bootstrap::ensure_admin(
        &db_pool,
        &config.bootstrap,
        config.security.password_hash_cost,
    ) {
        Ok(Some(account_id)) => info!(account_id = %account_id, "Bootstrap administrator ready"),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to seed bootstrap administrator");
            std::process::exit(1);
        }
    }

    let state = AppState::new(db_pool, &config).unwrap_or_else(|e| {
        error!(error = %e, "Failed to load session signing key");
        std::process::exit(1);
    });
    let app = create_router(state, &config);

    let http_addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, address = %http_addr, "Failed to bind HTTP server");
            std::process::exit(1);
        });

    info!(
        http_address = %http_addr,
        docs_url = %format!("http://{}/swagger-ui", http_addr),
        "HTTP server ready"
    );

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown signal received");
    };

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    {
        error!(error = %e, "HTTP server error");
    }

    info!("Server shutdown complete");
}

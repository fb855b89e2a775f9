use axum::{http::StatusCode, Router};
use food_shop_core::{database::run_migrations, AppContext, Config};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ApiConfig;
use crate::handlers::{self, AppState};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

pub async fn migrate() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    run_migrations(&config.database_url).await?;
    Ok(())
}

pub async fn serve(migrate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let api = ApiConfig::from_env(&config.auth)?;

    if migrate {
        run_migrations(&config.database_url).await?;
    }

    let ctx = AppContext::connect(&config).await?;
    let state = AppState::new(ctx, api.clone());

    let app = Router::new()
        .nest("/v1", handlers::router(state.clone()))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            api.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", api.port)).await?;
    info!("Food shop API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

mod app;
mod auth;
mod categories;
mod config;
mod db;
mod error;
mod items;
mod profiles;
mod requests;
mod state;
mod tags;
mod transactions;
mod users;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "rubhew=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    if let Err(e) = db::migrate(&state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    if let Some(seed) = &state.config.admin {
        if let Err(e) = users::seed_admin(&state.db, seed).await {
            tracing::warn!(error = %e, "admin seeding failed; continuing");
        }
    }

    let result = app::serve(app::build_app(state.clone())).await;
    state.close().await;
    result
}

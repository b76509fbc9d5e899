use anyhow::Context;
use secrecy::ExposeSecret;
use trivia_api::db::{self, SqliteStore};
use trivia_api::server::app::{run_server, AppState};
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load().context("Cannot load settings")?;

    let pool = db::establish_connection(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("Cannot connect to DB")?;

    if settings.database.migrate {
        tracing::info!("Running db migrations...");
        db::run_migrations(&pool).await?;
    }

    run_server(&settings.server, AppState::new(SqliteStore::new(pool))).await
}

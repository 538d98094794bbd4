use lifecherry_api::{config, is_production, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    server::init_tracing();

    let config = config::config().clone();
    if is_production!() && config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set in production");
    }

    server::serve(config).await
}

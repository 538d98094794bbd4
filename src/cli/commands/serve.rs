use clap::Args;

use crate::config::{AppConfig, DataBackend};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.memory {
        config.database.backend = DataBackend::Memory;
    }
    crate::server::serve(config).await
}

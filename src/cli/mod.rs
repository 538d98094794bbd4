pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lifecherry")]
#[command(about = "LifeCherry CLI - run and administer the comment API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply the database schema to DATABASE_URL")]
    Migrate,

    #[command(about = "Print the effective configuration")]
    Config(commands::config::ConfigArgs),

    #[command(about = "Mint a development JWT signed with the configured secret")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config().clone();

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args, config).await,
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::Config(args) => commands::config::handle(args, &config, output_format),
        Commands::Token(args) => commands::token::handle(args, &config, output_format),
    }
}

use clap::{Args, ValueEnum};

use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long, value_enum, default_value = "yaml", help = "Rendering format")]
    pub format: ConfigFormat,
}

/// Render the configuration. The JWT secret is never included.
pub fn render(config: &AppConfig, format: ConfigFormat) -> anyhow::Result<String> {
    Ok(match format {
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    })
}

pub fn handle(args: ConfigArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let format = match output_format {
        OutputFormat::Json => ConfigFormat::Json,
        OutputFormat::Text => args.format,
    };
    println!("{}", render(config, format)?);
    Ok(())
}

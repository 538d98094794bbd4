use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Email the token identifies")]
    pub email: String,

    #[arg(long, help = "Display name claim")]
    pub name: Option<String>,

    #[arg(long, help = "Photo URL claim")]
    pub picture: Option<String>,

    #[arg(long, help = "Lifetime in hours (defaults to security.jwt_expiry_hours)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let mut claims = Claims::new(&args.email, args.name, hours);
    if let Some(picture) = args.picture {
        claims = claims.with_picture(picture);
    }

    let token = generate_jwt(&claims, &config.security.jwt_secret)?;
    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "email": claims.email, "exp": claims.exp })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}

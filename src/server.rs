use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let auth = from_fn_with_state(state.clone(), jwt_auth_middleware);

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Listing is public, posting is not
        .route(
            "/api/lessons/:lesson_id/comments",
            get(public::list_comments).merge(post(protected::create_comment).route_layer(auth.clone())),
        )
        .merge(thread_routes().route_layer(auth.clone()))
        .merge(audit_routes().route_layer(auth));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// Comment, reply and reaction routes for every depth
fn thread_routes() -> Router<AppState> {
    use protected::{add_reply, delete_node, toggle_reaction, update_node};

    const DEPTHS: [&str; 4] = [
        "/api/comments/:comment_id",
        "/api/comments/:comment_id/replies/:reply_id",
        "/api/comments/:comment_id/replies/:reply_id/replies/:nested_id",
        "/api/comments/:comment_id/replies/:reply_id/replies/:nested_id/replies/:deep_id",
    ];

    let mut router = Router::new();
    for (depth, node) in DEPTHS.iter().enumerate() {
        router = router
            .route(node, axum::routing::patch(update_node).delete(delete_node))
            .route(&format!("{}/reactions", node), post(toggle_reaction));
        // Deep nested replies cannot be replied to
        if depth < crate::comment::MAX_DEPTH {
            router = router.route(&format!("{}/replies", node), post(add_reply));
        }
    }
    router
}

fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/api/audit/changes", get(protected::admin_changes))
        .route("/api/audit/me", get(protected::my_changes))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.environment == Environment::Development {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers(Any),
    )
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build state for `config` and serve until the process is stopped
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting LifeCherry API in {:?} mode", config.environment);

    let state = AppState::new(config).await?;
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("LifeCherry API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

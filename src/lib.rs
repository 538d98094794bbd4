pub mod auth;
pub mod cli;
pub mod comment;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;
pub mod state;
pub mod types;

pub use server::app;
pub use state::AppState;

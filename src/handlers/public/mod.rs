// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service banner, health probe and comment listing.

pub mod comments;
pub mod root;

pub use comments::list_comments;
pub use root::{health, root};

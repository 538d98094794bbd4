// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here runs behind `jwt_auth_middleware`, which injects the
// caller's `AuthUser` into request extensions.

pub mod audit;
pub mod comments;
pub mod reactions;
pub mod replies;

pub use audit::{my_changes, admin_changes};
pub use comments::create_comment;
pub use reactions::toggle_reaction;
pub use replies::{add_reply, delete_node, update_node};

//! Comment thread engine
//!
//! A lesson comment owns a reply tree bounded to three nesting levels.
//! Every node carries its own reaction set. Nodes are addressed by a
//! [`NodePath`] walked from the root comment on every operation.

pub mod error;
pub mod model;
pub mod path;
pub mod reaction;
pub mod tree;
pub mod validator;

pub use error::{NodeKind, TreeError};
pub use model::{Author, Comment, ReplyNode};
pub use path::{Level, NodePath, MAX_DEPTH};
pub use reaction::{Emoji, InvalidEmoji, Reaction, ReactionChange, Reactions};
pub use tree::ThreadNode;
pub use validator::ContentValidator;

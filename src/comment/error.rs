use std::fmt;

use thiserror::Error;

use super::path::Level;

/// What kind of node a message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Comment,
    Reply,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Comment => write!(f, "Comment"),
            NodeKind::Reply => write!(f, "Reply"),
        }
    }
}

/// Errors raised while resolving or mutating a comment tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("{}", .0.not_found_message())]
    NotFound(Level),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Replies cannot be nested more than 3 levels deep")]
    DepthExceeded,

    #[error("Path does not address a reply")]
    NotAReply,

    #[error("{0} content is required")]
    EmptyContent(NodeKind),

    #[error("{kind} content exceeds maximum length of {max} characters")]
    ContentTooLong { kind: NodeKind, max: usize },
}

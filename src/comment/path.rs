//! Path addressing inside a comment tree

use std::fmt;

use uuid::Uuid;

use super::error::{NodeKind, TreeError};

/// Deepest reply level a tree may hold (comment = 0)
pub const MAX_DEPTH: usize = 3;

/// Tree level a path segment addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Comment,
    Reply,
    NestedReply,
    DeepNestedReply,
}

impl Level {
    pub fn at_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => Some(Level::Comment),
            1 => Some(Level::Reply),
            2 => Some(Level::NestedReply),
            3 => Some(Level::DeepNestedReply),
            _ => None,
        }
    }

    pub fn depth(&self) -> usize {
        *self as usize
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Level::Comment => NodeKind::Comment,
            _ => NodeKind::Reply,
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            Level::Comment => "Comment not found",
            Level::Reply => "Reply not found",
            Level::NestedReply => "Nested reply not found",
            Level::DeepNestedReply => "Deep nested reply not found",
        }
    }
}

/// Ordered identifiers locating a node from its root comment.
///
/// Reply segments that are not valid ids are kept as `None`: they can never
/// match a node, so resolution reports them as missing at their own level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    comment_id: Uuid,
    replies: Vec<Option<Uuid>>,
}

impl NodePath {
    /// Path addressing the root comment itself
    pub fn comment(comment_id: Uuid) -> Self {
        Self {
            comment_id,
            replies: Vec::new(),
        }
    }

    /// Build a path from raw route segments below the comment
    pub fn parse(comment_id: Uuid, segments: &[&str]) -> Result<Self, TreeError> {
        if segments.len() > MAX_DEPTH {
            return Err(TreeError::DepthExceeded);
        }
        Ok(Self {
            comment_id,
            replies: segments
                .iter()
                .map(|s| Uuid::parse_str(s.trim()).ok())
                .collect(),
        })
    }

    /// Extend the path by one reply id
    pub fn child(&self, reply_id: Uuid) -> Result<Self, TreeError> {
        if self.replies.len() >= MAX_DEPTH {
            return Err(TreeError::DepthExceeded);
        }
        let mut replies = self.replies.clone();
        replies.push(Some(reply_id));
        Ok(Self {
            comment_id: self.comment_id,
            replies,
        })
    }

    pub fn comment_id(&self) -> Uuid {
        self.comment_id
    }

    pub fn reply_keys(&self) -> &[Option<Uuid>] {
        &self.replies
    }

    /// Depth of the addressed node (0 for the comment)
    pub fn depth(&self) -> usize {
        self.replies.len()
    }

    pub fn target_level(&self) -> Level {
        // Constructors cap the depth, so this always maps.
        Level::at_depth(self.depth()).unwrap_or(Level::DeepNestedReply)
    }

    /// Split into the parent path and the last reply key
    pub fn split_last(&self) -> Option<(NodePath, Option<Uuid>)> {
        let (last, rest) = self.replies.split_last()?;
        Some((
            NodePath {
                comment_id: self.comment_id,
                replies: rest.to_vec(),
            },
            *last,
        ))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.comment_id)?;
        for key in &self.replies {
            match key {
                Some(id) => write!(f, "/{}", id)?,
                None => write!(f, "/?")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_malformed_segments_as_misses() {
        let c = Uuid::new_v4();
        let r = Uuid::new_v4();
        let path = NodePath::parse(c, &[&r.to_string(), "bogus-id"]).unwrap();
        assert_eq!(path.depth(), 2);
        assert_eq!(path.reply_keys(), &[Some(r), None]);
        assert_eq!(path.target_level(), Level::NestedReply);
    }

    #[test]
    fn rejects_paths_deeper_than_three_replies() {
        let c = Uuid::new_v4();
        let ids: Vec<String> = (0..4).map(|_| Uuid::new_v4().to_string()).collect();
        let segs: Vec<&str> = ids.iter().map(String::as_str).collect();
        assert_eq!(NodePath::parse(c, &segs), Err(TreeError::DepthExceeded));

        let deep = NodePath::parse(c, &segs[..3]).unwrap();
        assert_eq!(deep.child(Uuid::new_v4()), Err(TreeError::DepthExceeded));
    }

    #[test]
    fn split_last_yields_parent() {
        let c = Uuid::new_v4();
        let r = Uuid::new_v4();
        let path = NodePath::comment(c).child(r).unwrap();
        let (parent, key) = path.split_last().unwrap();
        assert_eq!(parent, NodePath::comment(c));
        assert_eq!(key, Some(r));
        assert!(NodePath::comment(c).split_last().is_none());
    }

    #[test]
    fn level_messages() {
        assert_eq!(Level::Reply.not_found_message(), "Reply not found");
        assert_eq!(Level::at_depth(3), Some(Level::DeepNestedReply));
        assert_eq!(Level::at_depth(4), None);
    }
}

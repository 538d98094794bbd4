//! Path resolution and mutation of a comment tree
//!
//! All operations resolve their target from the root on each call. Nothing
//! here touches storage; callers load a comment, mutate it and save it back.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::TreeError;
use super::model::{Author, Comment, ReplyNode};
use super::path::{Level, NodePath, MAX_DEPTH};
use super::reaction::{Emoji, ReactionChange, Reactions};
use super::validator::ContentValidator;

/// Behaviour shared by the root comment and replies at every depth
pub trait ThreadNode {
    fn id(&self) -> Uuid;
    fn author(&self) -> &Author;
    fn content(&self) -> &str;
    fn reactions(&self) -> &Reactions;
    fn reactions_mut(&mut self) -> &mut Reactions;
    fn replies(&self) -> &[ReplyNode];
    fn replies_mut(&mut self) -> &mut Vec<ReplyNode>;
    fn set_content(&mut self, content: String, now: DateTime<Utc>);
}

macro_rules! impl_thread_node {
    ($ty:ty) => {
        impl ThreadNode for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn author(&self) -> &Author {
                &self.author
            }
            fn content(&self) -> &str {
                &self.content
            }
            fn reactions(&self) -> &Reactions {
                &self.reactions
            }
            fn reactions_mut(&mut self) -> &mut Reactions {
                &mut self.reactions
            }
            fn replies(&self) -> &[ReplyNode] {
                &self.replies
            }
            fn replies_mut(&mut self) -> &mut Vec<ReplyNode> {
                &mut self.replies
            }
            fn set_content(&mut self, content: String, now: DateTime<Utc>) {
                self.content = content;
                self.updated_at = now;
            }
        }
    };
}

impl_thread_node!(Comment);
impl_thread_node!(ReplyNode);

fn matches(key: &Option<Uuid>, node: &ReplyNode) -> bool {
    key.as_ref() == Some(&node.id)
}

fn level_of(depth: usize) -> Level {
    Level::at_depth(depth).unwrap_or(Level::DeepNestedReply)
}

impl Comment {
    /// Resolve a path to a node for reading
    pub fn node(&self, path: &NodePath) -> Result<&dyn ThreadNode, TreeError> {
        if path.comment_id() != self.id {
            return Err(TreeError::NotFound(Level::Comment));
        }
        let mut node: &dyn ThreadNode = self;
        for (idx, key) in path.reply_keys().iter().enumerate() {
            node = node
                .replies()
                .iter()
                .find(|r| matches(key, r))
                .map(|r| r as &dyn ThreadNode)
                .ok_or(TreeError::NotFound(level_of(idx + 1)))?;
        }
        Ok(node)
    }

    /// Resolve a path to a node for mutation
    pub fn node_mut(&mut self, path: &NodePath) -> Result<&mut dyn ThreadNode, TreeError> {
        if path.comment_id() != self.id {
            return Err(TreeError::NotFound(Level::Comment));
        }
        let mut node: &mut dyn ThreadNode = self;
        for (idx, key) in path.reply_keys().iter().enumerate() {
            let current = node;
            node = match current.replies_mut().iter_mut().find(|r| matches(key, r)) {
                Some(reply) => reply as &mut dyn ThreadNode,
                None => return Err(TreeError::NotFound(level_of(idx + 1))),
            };
        }
        tracing::debug!("Resolved node {} at depth {}", path, path.depth());
        Ok(node)
    }

    /// Append a reply under the node at `parent`; returns the new reply id
    pub fn append_reply(&mut self, parent: &NodePath, reply: ReplyNode) -> Result<Uuid, TreeError> {
        if parent.depth() >= MAX_DEPTH {
            return Err(TreeError::DepthExceeded);
        }
        let id = reply.id;
        self.node_mut(parent)?.replies_mut().push(reply);
        Ok(id)
    }

    /// Replace a node's content. Only the node's author may edit it, and
    /// the body is checked only once authorship is established.
    pub fn edit(
        &mut self,
        path: &NodePath,
        actor_email: &str,
        content: Option<&str>,
        validator: &ContentValidator,
        now: DateTime<Utc>,
    ) -> Result<(), TreeError> {
        let node = self.node_mut(path)?;
        if !node.author().is(actor_email) {
            return Err(TreeError::Forbidden(match path.depth() {
                0 => "Can only edit your own comments",
                _ => "Can only edit your own replies",
            }));
        }
        let content = validator.clean(path.target_level().kind(), content)?;
        node.set_content(content, now);
        Ok(())
    }

    /// Splice a reply, and with it its whole subtree, out of its parent.
    /// Only the reply's author may remove it.
    pub fn remove_reply(&mut self, path: &NodePath, actor_email: &str) -> Result<ReplyNode, TreeError> {
        let (parent_path, key) = path.split_last().ok_or(TreeError::NotAReply)?;
        let siblings = self.node_mut(&parent_path)?.replies_mut();
        let idx = siblings
            .iter()
            .position(|r| matches(&key, r))
            .ok_or(TreeError::NotFound(path.target_level()))?;

        if !siblings[idx].author.is(actor_email) {
            return Err(TreeError::Forbidden("Can only delete your own replies"));
        }
        Ok(siblings.remove(idx))
    }

    /// Check that `actor_email` authored the root comment
    pub fn ensure_author(&self, actor_email: &str, action: &'static str) -> Result<(), TreeError> {
        if self.author.is(actor_email) {
            Ok(())
        } else {
            Err(TreeError::Forbidden(action))
        }
    }

    /// Toggle `emoji` from `actor_email` on any node. No ownership check.
    pub fn toggle_reaction(
        &mut self,
        path: &NodePath,
        actor_email: &str,
        emoji: Emoji,
        now: DateTime<Utc>,
    ) -> Result<ReactionChange, TreeError> {
        let node = self.node_mut(path)?;
        Ok(node.reactions_mut().toggle(actor_email, emoji, now))
    }

    /// Deepest reply level present (0 when there are no replies)
    pub fn depth(&self) -> usize {
        self.replies.iter().map(ReplyNode::height).max().unwrap_or(0)
    }

    /// Total number of replies at every level
    pub fn reply_count(&self) -> usize {
        self.replies.iter().map(ReplyNode::subtree_len).sum()
    }
}

//! Emoji reactions with one-per-author toggle semantics

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of reactions a node accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Emoji {
    #[serde(rename = "👍")]
    ThumbsUp,
    #[serde(rename = "❤️")]
    Heart,
    #[serde(rename = "😂")]
    Laugh,
    #[serde(rename = "😮")]
    Wow,
    #[serde(rename = "😢")]
    Sad,
    #[serde(rename = "😡")]
    Angry,
}

impl Emoji {
    pub const ALL: [Emoji; 6] = [
        Emoji::ThumbsUp,
        Emoji::Heart,
        Emoji::Laugh,
        Emoji::Wow,
        Emoji::Sad,
        Emoji::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emoji::ThumbsUp => "👍",
            Emoji::Heart => "❤️",
            Emoji::Laugh => "😂",
            Emoji::Wow => "😮",
            Emoji::Sad => "😢",
            Emoji::Angry => "😡",
        }
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid reaction emoji")]
pub struct InvalidEmoji;

impl FromStr for Emoji {
    type Err = InvalidEmoji;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emoji::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or(InvalidEmoji)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub author_email: String,
    pub emoji: Emoji,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a toggle, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added(Emoji),
    Switched { from: Emoji, to: Emoji },
    Removed(Emoji),
}

/// Reactions on a single node. Holds at most one entry per author email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reactions(Vec<Reaction>);

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same emoji again removes it; a different emoji replaces the author's
    /// previous reaction.
    pub fn toggle(&mut self, author_email: &str, emoji: Emoji, now: DateTime<Utc>) -> ReactionChange {
        let previous = self
            .0
            .iter()
            .position(|r| r.author_email == author_email)
            .map(|idx| self.0.remove(idx).emoji);

        // Stored documents may predate the one-per-author rule.
        self.0.retain(|r| r.author_email != author_email);

        if previous == Some(emoji) {
            return ReactionChange::Removed(emoji);
        }

        self.0.push(Reaction {
            author_email: author_email.to_string(),
            emoji,
            created_at: now,
        });

        match previous {
            Some(from) => ReactionChange::Switched { from, to: emoji },
            None => ReactionChange::Added(emoji),
        }
    }

    pub fn by_author(&self, author_email: &str) -> Option<&Reaction> {
        self.0.iter().find(|r| r.author_email == author_email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reaction> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//! # Common Types
//!
//! This module contains the common types used throughout the application for
//! representing repository items, generated tweets and the current selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FetchError;

/// Which kind of closed item is listed for a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Commits,
    PullRequests,
}

impl Mode {
    /// Path segment used by the item source for this mode.
    pub fn path_segment(self) -> &'static str {
        match self {
            Mode::Commits => "commits",
            Mode::PullRequests => "pulls",
        }
    }

    /// Human readable plural, used in notices.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Commits => "commits",
            Mode::PullRequests => "pull requests",
        }
    }
}

/// An `owner/repo` identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Parse a user supplied identifier, trimming surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FetchError::EmptyRepository);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RepositoryId> for String {
    fn from(id: RepositoryId) -> Self {
        id.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The repository and mode a fetch was issued for.
///
/// Fetch outcomes carry the selection they originated from so the dashboard can
/// drop responses that no longer match what the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    pub repository: RepositoryId,
    pub mode: Mode,
}

/// A normalized commit or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Canonical web URL; unique per repository and item.
    pub key: String,
    pub title: String,
    pub body: String,
    /// Upstream identifier: the numeric id for pull requests, the sha for commits.
    pub source_id: String,
    /// Only set for commits.
    pub sha: Option<String>,
}

/// One generated tweet for an item key.
///
/// The serialized field names match the stored log format (`url`, `tweet`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRecord {
    #[serde(rename = "url")]
    pub key: String,
    #[serde(rename = "tweet")]
    pub text: String,
}

/// The single action an item card offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Generate,
    Publish,
}

/// An [`Item`] merged with its currently resolved tweet, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub item: Item,
    pub current_text: Option<String>,
}

impl DisplayItem {
    pub fn action(&self) -> ItemAction {
        if self.current_text.is_some() {
            ItemAction::Publish
        } else {
            ItemAction::Generate
        }
    }
}

//! # MarkAI
//!
//! `markai` turns a repository's recently closed commits or pull requests into
//! short marketing tweets. Items are listed from GitHub, tweets come from a text
//! generation backend, and every generated tweet is kept in a local append-only
//! log so it is shown again on the next visit instead of being regenerated.
//!
//! ## Features
//!
//! - List closed commits or pull requests for an `owner/repo` (or a local clone)
//! - Generate a tweet per item through an HTTP relay or an OpenAI-compatible API
//! - Persist the selected repository and all generated tweets
//! - Share a tweet through the browser
//!
//! ## Example
//!
//! ```no_run
//! use markai::app::Dashboard;
//! use markai::generation::{GenerationClient, RelayBackend};
//! use markai::items::{GitHubSource, ItemFetcher};
//! use markai::storage::SlotStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let fetcher = ItemFetcher::new(Arc::new(GitHubSource::new("https://api.github.com")?));
//! let relay = RelayBackend::new("http://localhost:3000/api/ai");
//! let generator = GenerationClient::new(Arc::new(relay));
//! let (mut dashboard, _) = Dashboard::restore(fetcher, generator, SlotStore::in_memory());
//!
//! let request = dashboard.select_repository_input("rust-lang/rust")?;
//! dashboard.refresh(request).await;
//! for item in dashboard.display_items() {
//!     println!("{} -> {:?}", item.item.title, item.current_text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod generation;
pub mod items;
pub mod share;
pub mod storage;
pub mod tweets;
pub mod types;

// Re-export main types for convenience
pub use app::Dashboard;
pub use config::Config;
pub use types::{AssociationRecord, DisplayItem, Item, Mode, RepositoryId};

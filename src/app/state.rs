use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{DashboardError, FetchError};
use crate::generation::GenerationClient;
use crate::items::{resolve_repository_input, ItemFetcher};
use crate::share::{intent_url, Sharer};
use crate::storage::{Slot, SlotStore};
use crate::tweets::TweetLog;
use crate::types::{DisplayItem, Item, Mode, RepositoryId, Selection};

/// Where the dashboard is in its refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No repository selected.
    Idle,
    /// A fetch for the current selection is outstanding.
    Loading,
    Loaded,
}

/// A one-shot message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

/// A fetch the caller should run and feed back through [`Dashboard::apply_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub selection: Selection,
}

/// A generation the caller should run and feed back through
/// [`Dashboard::complete_generation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub item: Item,
}

/// What [`Dashboard::apply_fetch`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    /// Items were replaced with this many new ones.
    Replaced(usize),
    /// Nothing was found; previous items kept and a notice raised.
    Empty,
    /// The fetch failed; previous items kept and a notice raised.
    Failed,
    /// The selection changed since the request was issued; outcome dropped.
    Stale,
}

/// Repository selection, item refresh and tweet association for one user.
///
/// Network work is not done while holding the dashboard: actions return request
/// values, the caller runs them with [`Dashboard::fetcher`] and
/// [`Dashboard::generator`], then applies the results. Outcomes for a selection
/// that is no longer current are discarded.
pub struct Dashboard {
    repository: Option<RepositoryId>,
    mode: Mode,
    phase: Phase,
    items: Vec<Item>,
    tweets: TweetLog,
    store: SlotStore,
    fetcher: ItemFetcher,
    generator: GenerationClient,
    notices: Vec<Notice>,
}

impl Dashboard {
    /// Restore persisted state. A restored repository comes back with the
    /// refresh request that should be run immediately.
    pub fn restore(
        fetcher: ItemFetcher,
        generator: GenerationClient,
        store: SlotStore,
    ) -> (Self, Option<RefreshRequest>) {
        let tweets = TweetLog::load(store.clone());
        let repository: Option<RepositoryId> = store.load(Slot::Repository);

        let mut dashboard = Self {
            repository: None,
            mode: Mode::default(),
            phase: Phase::Idle,
            items: Vec::new(),
            tweets,
            store,
            fetcher,
            generator,
            notices: Vec::new(),
        };

        let request = repository.map(|repository| {
            info!(%repository, "Restored repository selection");
            dashboard.enter_loading(repository)
        });
        (dashboard, request)
    }

    pub fn fetcher(&self) -> ItemFetcher {
        self.fetcher.clone()
    }

    pub fn generator(&self) -> GenerationClient {
        self.generator.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn repository(&self) -> Option<&RepositoryId> {
        self.repository.as_ref()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.repository.as_ref().map(|repository| Selection {
            repository: repository.clone(),
            mode: self.mode,
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn tweets(&self) -> &TweetLog {
        &self.tweets
    }

    /// Select a repository from user input (an `owner/repo` identifier or a
    /// path to a local clone).
    pub fn select_repository_input(
        &mut self,
        input: &str,
    ) -> Result<RefreshRequest, DashboardError> {
        let repository = resolve_repository_input(input)?;
        Ok(self.select_repository(repository))
    }

    /// Select a repository. The identifier is persisted before the fetch runs.
    pub fn select_repository(&mut self, repository: RepositoryId) -> RefreshRequest {
        if let Err(e) = self.store.save(Slot::Repository, &repository) {
            warn!(error = %e, "Failed to persist repository selection");
        }
        info!(%repository, "Selected repository");
        self.enter_loading(repository)
    }

    /// Change the listing mode. Returns a refresh request when a repository is
    /// selected and the mode actually changed.
    pub fn set_mode(&mut self, mode: Mode) -> Option<RefreshRequest> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        debug!(?mode, "Mode changed");
        let repository = self.repository.clone()?;
        Some(self.enter_loading(repository))
    }

    /// Go back to idle. Generated tweets are kept.
    pub fn remove_repository(&mut self) {
        if let Some(repository) = self.repository.take() {
            info!(%repository, "Removed repository");
        }
        self.items.clear();
        self.phase = Phase::Idle;
        if let Err(e) = self.store.clear(Slot::Repository) {
            warn!(error = %e, "Failed to clear persisted repository");
        }
    }

    fn enter_loading(&mut self, repository: RepositoryId) -> RefreshRequest {
        self.repository = Some(repository.clone());
        self.phase = Phase::Loading;
        RefreshRequest {
            selection: Selection {
                repository,
                mode: self.mode,
            },
        }
    }

    /// Apply the outcome of a fetch issued for `request`.
    pub fn apply_fetch(
        &mut self,
        request: &RefreshRequest,
        outcome: Result<Vec<Item>, FetchError>,
    ) -> FetchApplied {
        if self.selection().as_ref() != Some(&request.selection) {
            debug!(
                repository = %request.selection.repository,
                mode = ?request.selection.mode,
                "Discarding stale fetch outcome"
            );
            return FetchApplied::Stale;
        }

        self.phase = Phase::Loaded;
        let selection = &request.selection;
        match outcome {
            Ok(items) if items.is_empty() => {
                self.notices.push(Notice::new(format!(
                    "No {} found. Please try another repository or check the repository name.",
                    selection.mode.label()
                )));
                FetchApplied::Empty
            }
            Ok(items) => {
                let count = items.len();
                self.items = items;
                FetchApplied::Replaced(count)
            }
            Err(e) => {
                warn!(repository = %selection.repository, error = %e, "Fetch failed");
                self.notices.push(Notice::new(format!(
                    "Could not load {} for {}: {e}",
                    selection.mode.label(),
                    selection.repository
                )));
                FetchApplied::Failed
            }
        }
    }

    /// Run a fetch and apply it in one go.
    pub async fn refresh(&mut self, request: RefreshRequest) -> FetchApplied {
        let outcome = self.fetcher.fetch_selection(&request.selection).await;
        self.apply_fetch(&request, outcome)
    }

    /// Start generating a tweet for the item with `key`.
    pub fn begin_generation(&self, key: &str) -> Result<GenerationRequest, DashboardError> {
        let item = self
            .items
            .iter()
            .find(|item| item.key == key)
            .ok_or_else(|| DashboardError::UnknownItem(key.to_string()))?;
        if self.tweets.resolve(key).is_some() {
            return Err(DashboardError::AlreadyGenerated(key.to_string()));
        }
        Ok(GenerationRequest { item: item.clone() })
    }

    /// Record generated text for the request's item.
    pub fn complete_generation(&mut self, request: GenerationRequest, text: String) {
        debug!(key = %request.item.key, "Recording tweet");
        self.tweets.append(request.item.key, text);
    }

    /// Generate and record a tweet in one go.
    pub async fn generate(&mut self, key: &str) -> Result<String, DashboardError> {
        let request = self.begin_generation(key)?;
        let text = self.generator.generate(&request.item).await;
        self.complete_generation(request, text.clone());
        Ok(text)
    }

    /// Hand the item's current tweet to `sharer`. Returns the share URL.
    pub fn publish(&self, key: &str, sharer: &dyn Sharer) -> Result<String, DashboardError> {
        let text = self
            .tweets
            .resolve(key)
            .ok_or_else(|| DashboardError::NothingToPublish(key.to_string()))?;
        let url = intent_url(text);
        sharer.share(&url).map_err(DashboardError::Share)?;
        Ok(url)
    }

    /// Current items merged with their latest tweets.
    pub fn display_items(&self) -> Vec<DisplayItem> {
        self.items
            .iter()
            .map(|item| DisplayItem {
                item: item.clone(),
                current_text: self.tweets.resolve(&item.key).map(str::to_string),
            })
            .collect()
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

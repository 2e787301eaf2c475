use super::local::{looks_like_path, parse_github_remote, repository_from_clone};
use super::*;
use crate::error::FetchError;
use crate::types::{Mode, RepositoryId};
use async_trait::async_trait;
use git2::Repository;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct StaticSource {
    payload: Value,
    calls: AtomicUsize,
}

impl StaticSource {
    fn new(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            payload,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ItemSource for StaticSource {
    async fn list_closed(
        &self,
        _repository: &RepositoryId,
        _mode: Mode,
    ) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

#[test]
fn test_normalize_commit_record() {
    let record = json!({"html_url": "u1", "commit": {"message": "fix: bug"}});
    let item = normalize_record(&record, Mode::Commits, 0).unwrap();

    assert_eq!(item.key, "u1");
    assert_eq!(item.body, "fix: bug");
    assert_eq!(item.title, "fix: bug");
    assert_eq!(item.sha, None);
}

#[test]
fn test_normalize_commit_title_is_first_line() {
    let record = json!({
        "html_url": "https://github.com/o/r/commit/abc",
        "sha": "abc",
        "commit": {"message": "feat: add export\n\nLonger description here."}
    });
    let item = normalize_record(&record, Mode::Commits, 0).unwrap();

    assert_eq!(item.title, "feat: add export");
    assert_eq!(item.body, "feat: add export\n\nLonger description here.");
    assert_eq!(item.sha.as_deref(), Some("abc"));
    assert_eq!(item.source_id, "abc");
}

#[test]
fn test_normalize_pull_request_record() {
    let record = json!({"html_url": "u2", "title": "Add X", "body": "desc", "id": 42});
    let item = normalize_record(&record, Mode::PullRequests, 0).unwrap();

    assert_eq!(item.key, "u2");
    assert_eq!(item.body, "desc");
    assert_eq!(item.title, "Add X");
    assert_eq!(item.source_id, "42");
    assert_eq!(item.sha, None);
}

#[test]
fn test_normalize_pull_request_null_body() {
    let record = json!({"html_url": "u3", "title": "Empty", "body": null});
    let item = normalize_record(&record, Mode::PullRequests, 0).unwrap();
    assert_eq!(item.body, "");
}

#[test]
fn test_missing_url_fails_batch() {
    let payload = json!([
        {"html_url": "u1", "commit": {"message": "ok"}},
        {"commit": {"message": "no url"}},
    ]);
    let result = normalize_payload(&payload, Mode::Commits);

    assert!(matches!(
        result,
        Err(FetchError::MissingField { index: 1, field: "html_url" })
    ));
}

#[test]
fn test_non_list_payload_is_empty() {
    let payload = json!({"message": "Not Found", "documentation_url": "https://docs.github.com"});
    assert!(normalize_payload(&payload, Mode::PullRequests).unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_rejects_empty_repository_without_request() {
    let source = StaticSource::new(json!([]));
    let fetcher = ItemFetcher::new(source.clone());

    let result = fetcher.fetch("   ", Mode::Commits).await;

    assert!(matches!(result, Err(FetchError::EmptyRepository)));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_normalizes_in_mode() {
    let source = StaticSource::new(json!([
        {"html_url": "u1", "title": "PR one", "body": "b1", "id": 1},
        {"html_url": "u2", "title": "PR two", "id": 2},
    ]));
    let fetcher = ItemFetcher::new(source.clone());

    let items = fetcher.fetch("owner/repo", Mode::PullRequests).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].title, "PR two");
    assert_eq!(items[1].body, "");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listing_url() {
    let source = GitHubSource::new("https://api.github.com/").unwrap();
    let repo = RepositoryId::parse("owner/repo").unwrap();

    assert_eq!(
        source.listing_url(&repo, Mode::PullRequests),
        "https://api.github.com/repos/owner/repo/pulls?state=closed"
    );
    assert_eq!(
        source.listing_url(&repo, Mode::Commits),
        "https://api.github.com/repos/owner/repo/commits?state=closed"
    );
}

#[test]
fn test_parse_github_remote_forms() {
    for url in [
        "https://github.com/owner/repo",
        "https://github.com/owner/repo.git",
        "git@github.com:owner/repo.git",
        "ssh://git@github.com/owner/repo",
    ] {
        assert_eq!(parse_github_remote(url).unwrap().as_str(), "owner/repo", "{url}");
    }

    assert!(parse_github_remote("https://gitlab.com/owner/repo").is_err());
    assert!(parse_github_remote("https://github.com/owner").is_err());
}

fn setup_test_clone(origin: Option<&str>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    if let Some(url) = origin {
        repo.remote("origin", url).unwrap();
    }
    temp_dir
}

#[test]
fn test_repository_from_clone_reads_origin() {
    let temp_dir = setup_test_clone(Some("git@github.com:owner/markai.git"));
    let id = repository_from_clone(temp_dir.path()).unwrap();
    assert_eq!(id.as_str(), "owner/markai");
}

#[test]
fn test_resolve_input_prefers_local_clone() {
    let temp_dir = setup_test_clone(Some("https://github.com/owner/from-clone"));
    let input = temp_dir.path().to_str().unwrap();

    assert_eq!(resolve_repository_input(input).unwrap().as_str(), "owner/from-clone");
    assert_eq!(resolve_repository_input(" owner/typed ").unwrap().as_str(), "owner/typed");
    assert!(resolve_repository_input("").is_err());
}

#[test]
fn test_looks_like_path() {
    assert!(looks_like_path("/home/me/markai"));
    assert!(looks_like_path("./markai"));
    assert!(looks_like_path("../markai"));
    assert!(looks_like_path("~/src/markai"));

    assert!(!looks_like_path("owner/repo"));
    assert!(!looks_like_path("markai"));
    assert!(!looks_like_path(""));
}

#[test]
fn test_relative_owner_repo_ignores_matching_directory() {
    // A directory named like the identifier, holding a clone of something else.
    let temp_dir = TempDir::new().unwrap();
    let shadow = temp_dir.path().join("owner").join("repo");
    std::fs::create_dir_all(&shadow).unwrap();
    let repo = Repository::init(&shadow).unwrap();
    repo.remote("origin", "https://github.com/someone/else").unwrap();

    let previous_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();
    let typed = resolve_repository_input("owner/repo");
    let dotted = resolve_repository_input("./owner/repo");
    std::env::set_current_dir(previous_dir).unwrap();

    assert_eq!(typed.unwrap().as_str(), "owner/repo");
    assert_eq!(dotted.unwrap().as_str(), "someone/else");
}

#[test]
fn test_repository_from_clone_without_origin() {
    let temp_dir = setup_test_clone(None);
    assert!(repository_from_clone(temp_dir.path()).is_err());
}

use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FetchError, LocalRepoError};
use crate::types::RepositoryId;

/// Turn user input into a repository identifier.
///
/// Input that looks like a filesystem path (absolute, or starting with `.` or
/// `~`) and names a local git clone resolves through the clone's `origin`
/// remote. Anything else is parsed as `owner/repo`, even if a directory of that
/// name exists under the working directory.
pub fn resolve_repository_input(input: &str) -> Result<RepositoryId, FetchError> {
    let trimmed = input.trim();
    if looks_like_path(trimmed) {
        let path = expand_home(trimmed);
        if path.is_dir() {
            match repository_from_clone(&path) {
                Ok(id) => return Ok(id),
                Err(e) => debug!(input = trimmed, error = %e, "Not a usable local clone"),
            }
        }
    }
    RepositoryId::parse(trimmed)
}

pub(crate) fn looks_like_path(input: &str) -> bool {
    input.starts_with('.') || input.starts_with('~') || Path::new(input).is_absolute()
}

fn expand_home(input: &str) -> PathBuf {
    let rest = match input.strip_prefix('~') {
        Some(rest) => rest,
        None => return PathBuf::from(input),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => match rest.strip_prefix('/') {
            Some(rest) => home.join(rest),
            // `~user` is not expanded.
            None => PathBuf::from(input),
        },
        None => PathBuf::from(input),
    }
}

/// Read the `owner/repo` identifier from a clone's `origin` remote.
pub fn repository_from_clone(path: &Path) -> Result<RepositoryId, LocalRepoError> {
    let repo = Repository::open(path)?;
    let remote = repo.find_remote("origin")?;
    let url = remote.url().ok_or(LocalRepoError::NoOriginUrl)?;
    parse_github_remote(url)
}

/// Extract `owner/repo` from the common GitHub remote URL forms.
pub fn parse_github_remote(url: &str) -> Result<RepositoryId, LocalRepoError> {
    let path = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("git@github.com:"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .ok_or_else(|| LocalRepoError::NotGitHub(url.to_string()))?;

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            RepositoryId::parse(&format!("{owner}/{name}"))
                .map_err(|_| LocalRepoError::NotGitHub(url.to_string()))
        }
        _ => Err(LocalRepoError::NotGitHub(url.to_string())),
    }
}

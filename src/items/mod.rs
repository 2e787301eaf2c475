mod fetch;
pub mod local;
pub mod normalize;

pub use fetch::{GitHubSource, ItemFetcher, ItemSource, GITHUB_API_URL};
pub use local::resolve_repository_input;
pub use normalize::{normalize_payload, normalize_record};

#[cfg(test)]
mod tests;

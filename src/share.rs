use tracing::info;

pub const TWEET_INTENT_URL: &str = "https://twitter.com/intent/tweet";

/// Build the share URL for a tweet.
///
/// `#` must be percent-encoded or the destination reads it as a fragment.
pub fn intent_url(text: &str) -> String {
    format!("{TWEET_INTENT_URL}?text={}", text.replace('#', "%23"))
}

/// Hands a ready-to-publish URL to whatever opens it.
pub trait Sharer {
    fn share(&self, url: &str) -> std::io::Result<()>;
}

/// Opens share URLs in the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSharer;

impl Sharer for BrowserSharer {
    fn share(&self, url: &str) -> std::io::Result<()> {
        info!(%url, "Opening share URL");
        open::that(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_percent_encoded() {
        let url = intent_url("Fixed it #hotfix #rust");
        assert_eq!(
            url,
            "https://twitter.com/intent/tweet?text=Fixed it %23hotfix %23rust"
        );
        assert!(!url.contains('#'));
    }
}

use url::Url;

/// Display form of any well-formed webhook URL
pub const MASKED_WEBHOOK_URL: &str = "https://hooks.slack.com/services/T****/B****/****";

/// Display form of a URL that could not be parsed
pub const INVALID_URL: &str = "Invalid URL";

/// Minimum number of `/`-separated path parts for a maskable webhook URL
const MIN_PATH_PARTS: usize = 4;

/// Shape a webhook URL has to have before anything is posted to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookPolicy {
    pub scheme: String,
    pub host: String,
    pub path_prefix: String,
}

impl WebhookPolicy {
    /// Slack incoming webhooks: `https://hooks.slack.com/services/...`
    pub fn slack() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "hooks.slack.com".to_string(),
            path_prefix: "/services/".to_string(),
        }
    }

    /// Whether `url` parses and matches this policy's scheme, host and path prefix
    pub fn is_valid(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.scheme() == self.scheme
                    && parsed.host_str() == Some(self.host.as_str())
                    && parsed.path().starts_with(&self.path_prefix)
            }
            Err(_) => false,
        }
    }
}

impl Default for WebhookPolicy {
    fn default() -> Self {
        Self::slack()
    }
}

/// Validate a Slack webhook URL
pub fn is_valid_webhook_url(url: &str) -> bool {
    WebhookPolicy::slack().is_valid(url)
}

/// Mask a webhook URL for display.
///
/// The result never contains any part of the input.
pub fn mask_webhook_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.path().split('/').count() >= MIN_PATH_PARTS => {
            MASKED_WEBHOOK_URL.to_string()
        }
        _ => INVALID_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_webhook_url() {
        assert!(is_valid_webhook_url("https://hooks.slack.com/services/T1/B1/X1"));
    }

    #[test]
    fn test_rejects_wrong_scheme() {
        assert!(!is_valid_webhook_url("http://hooks.slack.com/services/T1/B1/X1"));
    }

    #[test]
    fn test_rejects_wrong_host() {
        assert!(!is_valid_webhook_url("https://evil.example.com/services/T1"));
        assert!(!is_valid_webhook_url("https://hooks.slack.com.evil.example.com/services/T1"));
        assert!(!is_valid_webhook_url("https://slack.com/services/T1/B1/X1"));
    }

    #[test]
    fn test_rejects_wrong_path() {
        assert!(!is_valid_webhook_url("https://hooks.slack.com/workflows/T1/B1/X1"));
        assert!(!is_valid_webhook_url("https://hooks.slack.com/services"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(!is_valid_webhook_url(""));
        assert!(!is_valid_webhook_url("not a url"));
        assert!(!is_valid_webhook_url("hooks.slack.com/services/T1/B1/X1"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = WebhookPolicy {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            path_prefix: "/services/".to_string(),
        };
        assert!(policy.is_valid("http://127.0.0.1:4321/services/T1/B1/X1"));
        assert!(!policy.is_valid("https://hooks.slack.com/services/T1/B1/X1"));
    }

    #[test]
    fn test_mask_webhook_url() {
        assert_eq!(
            mask_webhook_url("https://hooks.slack.com/services/T123/B456/abcdef"),
            MASKED_WEBHOOK_URL
        );
        assert_eq!(mask_webhook_url("https://hooks.slack.com/services/T1"), INVALID_URL);
        assert_eq!(mask_webhook_url("not a url"), INVALID_URL);
    }

    #[test]
    fn test_mask_never_echoes_segments() {
        let masked = mask_webhook_url("https://example.com/aaa/bbb/ccc");
        assert!(!masked.contains("aaa"));
        assert!(!masked.contains("ccc"));
    }
}

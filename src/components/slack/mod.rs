mod format;
mod poster;
mod webhook;

pub use format::{format_for_slack, DIGEST_FOOTER, DIGEST_HEADER};
pub use poster::{
    PostFailure, SlackMessage, SlackPostResult, SlackPoster, MAX_MESSAGE_CHARS,
    TEST_CONNECTION_MESSAGE,
};
pub use webhook::{is_valid_webhook_url, mask_webhook_url, WebhookPolicy, INVALID_URL, MASKED_WEBHOOK_URL};

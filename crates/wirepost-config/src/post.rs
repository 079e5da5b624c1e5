use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Target of every HTTP POST. An `https:` scheme selects the
    /// TLS-capable client with its trust-all test posture.
    pub url: SmolStr,

    /// Request `Content-Type`. `application/x-www-form-urlencoded`
    /// switches the body to a single form-encoded `name=value` pair.
    #[serde(default = "default_content_type")]
    pub content_type: SmolStr,

    /// Log every request/response pair with its sequence number.
    #[serde(default)]
    pub log_http_post_actions: bool,
}

fn default_content_type() -> SmolStr {
    SmolStr::new_inline("text/plain")
}

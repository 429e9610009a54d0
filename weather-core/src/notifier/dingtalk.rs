use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::WebhookConfig,
    error::{Endpoint, Error, Result, truncate_body},
    sign::SignedRequest,
};

use super::Notifier;

pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct MarkdownMsg<'a> {
    msgtype: &'a str,
    markdown: MarkdownContent<'a>,
}

#[derive(Debug, Serialize)]
struct MarkdownContent<'a> {
    title: &'a str,
    text: &'a str,
}

/// DingTalk group robot, optionally with signed requests.
#[derive(Debug, Clone)]
pub struct DingTalkNotifier {
    config: WebhookConfig,
    http: Client,
}

impl DingTalkNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn secret(&self) -> Option<&str> {
        self.config
            .secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Webhook URL for a request made at `timestamp_ms`.
    ///
    /// With a secret, `timestamp` and `sign` are appended as raw query text so
    /// the already URL-encoded signature is not encoded a second time.
    pub fn request_url(&self, timestamp_ms: i64) -> String {
        let Some(secret) = self.secret() else {
            return self.config.url.clone();
        };

        let signed = SignedRequest::new(timestamp_ms, secret);
        let url = &self.config.url;
        let separator = match url.find('?') {
            None => "?",
            Some(_) if url.ends_with('?') || url.ends_with('&') => "",
            Some(_) => "&",
        };

        format!("{url}{separator}{}", signed.query())
    }

    /// Send as if the current time were `timestamp_ms`.
    pub async fn notify_at(
        &self,
        title: &str,
        text: &str,
        timestamp_ms: i64,
    ) -> Result<serde_json::Value> {
        let endpoint = Endpoint::Webhook;
        let payload = MarkdownMsg {
            msgtype: "markdown",
            markdown: MarkdownContent { title, text },
        };

        debug!(signed = self.secret().is_some(), "posting report to webhook");

        let res = self
            .http
            .post(self.request_url(timestamp_ms))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(Error::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        // The reply is informational only; keep non-JSON bodies as text.
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| serde_json::Value::String(body)))
    }
}

#[async_trait]
impl Notifier for DingTalkNotifier {
    async fn notify(&self, title: &str, text: &str) -> Result<serde_json::Value> {
        self.notify_at(title, text, Utc::now().timestamp_millis()).await
    }
}

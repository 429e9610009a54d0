use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;

pub mod dingtalk;

pub use dingtalk::DingTalkNotifier;

/// Write side of a run: deliver one rendered message.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Post `text` under `title`, returning the endpoint's response body.
    async fn notify(&self, title: &str, text: &str) -> Result<serde_json::Value>;
}

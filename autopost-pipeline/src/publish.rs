use async_trait::async_trait;
use autopost_http::StatusCode;
use autopost_social::twitter::TwitterApi;
use autopost_social::twitter::types::CreatePostResponse;

/// Outcome of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub success: bool,
    /// Id of the created post, when the response carried one.
    pub post_id: Option<String>,
    pub status: Option<u16>,
    /// Response body (or transport error) kept for diagnostics on failure.
    pub body: Option<String>,
}

impl PublishResult {
    pub fn published(post_id: Option<String>, status: Option<u16>) -> Self {
        Self {
            success: true,
            post_id,
            status,
            body: None,
        }
    }

    pub fn failed(status: Option<u16>, body: impl Into<String>) -> Self {
        Self {
            success: false,
            post_id: None,
            status,
            body: Some(body.into()),
        }
    }
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str, in_reply_to: Option<&str>) -> PublishResult;

    /// `true` when nothing is actually sent.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Posts through `POST /2/tweets`; only `201 Created` counts as success.
pub struct TweetPublisher {
    api: TwitterApi,
}

impl TweetPublisher {
    pub fn new(api: TwitterApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Publisher for TweetPublisher {
    async fn publish(&self, text: &str, in_reply_to: Option<&str>) -> PublishResult {
        match self.api.create_post(text, in_reply_to).await {
            Ok(raw) if raw.status == StatusCode::CREATED => {
                let post_id = raw.json::<CreatePostResponse>().ok().map(|r| r.data.id);
                tracing::info!(
                    post_id = post_id.as_deref().unwrap_or("-"),
                    in_reply_to = in_reply_to.unwrap_or("-"),
                    "publish.succeeded"
                );
                PublishResult::published(post_id, Some(raw.status.as_u16()))
            }
            Ok(raw) => {
                tracing::error!(
                    status = raw.status.as_u16(),
                    request_id = %raw.request_id,
                    message = %raw.error_message(),
                    "publish.failed"
                );
                PublishResult::failed(Some(raw.status.as_u16()), raw.body)
            }
            Err(err) => {
                tracing::error!(error = %err, "publish.failed");
                PublishResult::failed(err.status().map(|s| s.as_u16()), err.to_string())
            }
        }
    }
}

/// Logs what would have been posted.
#[derive(Debug, Default)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, text: &str, in_reply_to: Option<&str>) -> PublishResult {
        tracing::info!(
            in_reply_to = in_reply_to.unwrap_or("-"),
            chars = text.chars().count(),
            text,
            "publish.dry_run"
        );
        PublishResult::published(None, None)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

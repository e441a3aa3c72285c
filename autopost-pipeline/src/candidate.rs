use autopost_social::news::types::Article;
use autopost_social::twitter::extract::{MediaIndex, media_urls};
use autopost_social::twitter::types::Tweet;
use serde::Serialize;

/// Decoded entry of the timeline's `includes.media` table.
pub use autopost_social::twitter::types::Media as MediaAsset;

/// One piece of fetched content the selector can choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub text: String,
    /// Only news articles carry a title.
    pub title: Option<String>,
    pub media_urls: Vec<String>,
    /// Reply count for timeline posts; used for ranking.
    pub engagement: Option<u64>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            title: None,
            media_urls: Vec::new(),
            engagement: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_media_urls(mut self, urls: Vec<String>) -> Self {
        self.media_urls = urls;
        self
    }

    pub fn with_engagement(mut self, engagement: u64) -> Self {
        self.engagement = Some(engagement);
        self
    }

    /// A timeline post with its attachment URLs resolved through `media`.
    pub fn from_tweet(tweet: &Tweet, media: &MediaIndex) -> Self {
        Self {
            id: tweet.id.clone(),
            text: tweet.text.clone(),
            title: None,
            media_urls: media_urls(tweet, media),
            engagement: tweet.reply_count(),
        }
    }

    /// A news article; `None` unless it has both a title and a description.
    /// `position` stands in for the id when the article has no URL.
    pub fn from_article(position: usize, article: &Article) -> Option<Self> {
        let (title, description) = article.headline()?;
        let id = article
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| position.to_string());
        Some(Self::new(id, description).with_title(title))
    }

    /// Title when present and non-blank, otherwise the body text.
    pub fn headline(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.text.trim())
    }
}

//! Read side of a run. Sources never fail: a fetch error is logged and
//! becomes an empty candidate set, which ends the run gracefully.
use crate::candidate::Candidate;
use async_trait::async_trait;
use autopost_social::news::{NewsApi, NewsQuery};
use autopost_social::twitter::extract::{drop_referenced, index_media};
use autopost_social::twitter::{TimelineQuery, TwitterApi};

/// Number of fetched articles echoed to the log.
const LOGGED_ARTICLES: usize = 5;

#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch(&self) -> Vec<Candidate>;

    fn name(&self) -> &'static str;
}

/// The authenticated account's reverse-chronological home timeline.
pub struct TimelineSource {
    api: TwitterApi,
    user_id: Option<String>,
    query: TimelineQuery,
}

impl TimelineSource {
    pub fn new(api: TwitterApi, query: TimelineQuery) -> Self {
        Self {
            api,
            user_id: None,
            query,
        }
    }

    /// Skip the `users/me` lookup.
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    async fn resolve_user_id(&self) -> Option<String> {
        if let Some(id) = &self.user_id {
            return Some(id.clone());
        }
        match self.api.me().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, username = ?user.username, "timeline.user.resolved");
                Some(user.id)
            }
            Err(err) => {
                tracing::error!(error = %err, status = ?err.status(), "timeline.user.failed");
                None
            }
        }
    }
}

#[async_trait]
impl CandidateSource for TimelineSource {
    async fn fetch(&self) -> Vec<Candidate> {
        let Some(user_id) = self.resolve_user_id().await else {
            return Vec::new();
        };

        let resp = match self.api.home_timeline(&user_id, &self.query).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::error!(error = %err, status = ?err.status(), "timeline.fetch.failed");
                return Vec::new();
            }
        };

        let media = index_media(resp.includes.as_ref());
        let candidates: Vec<Candidate> = drop_referenced(resp.data.unwrap_or_default())
            .iter()
            .map(|t| Candidate::from_tweet(t, &media))
            .collect();
        tracing::info!(candidates = candidates.len(), "timeline.fetched");
        candidates
    }

    fn name(&self) -> &'static str {
        "timeline"
    }
}

/// Recent articles from the news search endpoint.
pub struct NewsSource {
    api: NewsApi,
    query: NewsQuery,
}

impl NewsSource {
    pub fn new(api: NewsApi, query: NewsQuery) -> Self {
        Self { api, query }
    }
}

#[async_trait]
impl CandidateSource for NewsSource {
    async fn fetch(&self) -> Vec<Candidate> {
        let articles = match self.api.headlines(&self.query).await {
            Ok(articles) => articles,
            Err(err) => {
                tracing::error!(error = %err, status = ?err.status(), "news.fetch.failed");
                return Vec::new();
            }
        };

        let candidates: Vec<Candidate> = articles
            .iter()
            .enumerate()
            .filter_map(|(i, a)| Candidate::from_article(i, a))
            .collect();

        for (i, c) in candidates.iter().take(LOGGED_ARTICLES).enumerate() {
            tracing::info!(rank = i + 1, title = c.headline(), summary = %c.text, "news.article");
        }
        tracing::info!(candidates = candidates.len(), "news.fetched");
        candidates
    }

    fn name(&self) -> &'static str {
        "news"
    }
}

/// A fixed list of posts, e.g. greetings from configuration.
pub struct LiteralSource {
    items: Vec<String>,
}

impl LiteralSource {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl CandidateSource for LiteralSource {
    async fn fetch(&self) -> Vec<Candidate> {
        self.items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, s)| Candidate::new(format!("literal-{i}"), s))
            .collect()
    }

    fn name(&self) -> &'static str {
        "literal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn literal_source_skips_blank_entries() {
        let source = LiteralSource::new(vec!["gm".into(), "  ".into(), " hello ".into()]);
        let items = source.fetch().await;
        let texts: Vec<&str> = items.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["gm", "hello"]);
        assert_eq!(items[1].id, "literal-1");
    }
}

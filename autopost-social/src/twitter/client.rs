//! Minimal wrapper around the X v2 API with OAuth 1.0a user-context auth.
//!
//! Handles auth and request parameter shaping before delegating to the
//! shared HTTP client. Every call is a single attempt.
use crate::twitter::types::{
    CreatePostRequest, ReplySettings, TimelineResponse, User, UserResponse,
};
use autopost_http::oauth::OAuth1Keys;
use autopost_http::{Auth, HttpClient, HttpError, Method, RawResponse, RequestOpts};
use std::borrow::Cow;

const TIMELINE_TWEET_FIELDS: &str = "public_metrics,attachments,text,referenced_tweets";
const TIMELINE_EXPANSIONS: &str = "attachments.media_keys";
const TIMELINE_MEDIA_FIELDS: &str = "url,type";

/// Shape of a reverse-chronological home timeline request.
#[derive(Debug, Clone)]
pub struct TimelineQuery {
    /// Page size; the API accepts 1..=100.
    pub max_results: u32,
    /// Server-side exclusions, e.g. `retweets`, `replies`.
    pub exclude: Vec<String>,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            max_results: 50,
            exclude: vec!["retweets".into(), "replies".into()],
        }
    }
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    keys: OAuth1Keys,
}

impl TwitterApi {
    pub fn new(base_url: &str, keys: OAuth1Keys) -> Result<Self, HttpError> {
        let http = HttpClient::new(base_url)?;
        Ok(Self { http, keys })
    }

    /// `GET /2/users/me`: the account the credentials belong to.
    pub async fn me(&self) -> Result<User, HttpError> {
        let resp: UserResponse = self
            .http
            .get_json(
                "2/users/me",
                RequestOpts {
                    auth: Some(Auth::OAuth1(&self.keys)),
                    ..Default::default()
                },
            )
            .await?;
        Ok(resp.data)
    }

    /// `GET /2/users/{id}/timelines/reverse_chronological` with media expanded.
    pub async fn home_timeline(
        &self,
        user_id: &str,
        query: &TimelineQuery,
    ) -> Result<TimelineResponse, HttpError> {
        let max_results = query.max_results.clamp(1, 100);

        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("max_results", max_results.to_string().into()),
            ("tweet.fields", TIMELINE_TWEET_FIELDS.into()),
            ("expansions", TIMELINE_EXPANSIONS.into()),
            ("media.fields", TIMELINE_MEDIA_FIELDS.into()),
        ];
        if !query.exclude.is_empty() {
            params.push(("exclude", query.exclude.join(",").into()));
        }

        let path = format!("2/users/{user_id}/timelines/reverse_chronological");
        let resp: TimelineResponse = self
            .http
            .get_json(
                &path,
                RequestOpts {
                    auth: Some(Auth::OAuth1(&self.keys)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            tweets = resp.data.as_ref().map(Vec::len).unwrap_or(0),
            media = resp
                .includes
                .as_ref()
                .and_then(|i| i.media.as_ref())
                .map(Vec::len)
                .unwrap_or(0),
            "twitter.timeline.fetched"
        );
        Ok(resp)
    }

    /// `POST /2/tweets`. The raw exchange is returned so callers can apply
    /// their own notion of success to the status code.
    pub async fn create_post(
        &self,
        text: &str,
        in_reply_to: Option<&str>,
    ) -> Result<RawResponse, HttpError> {
        let body = CreatePostRequest {
            text,
            reply: in_reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id,
            }),
        };
        self.http
            .execute(
                Method::POST,
                "2/tweets",
                Some(&body),
                RequestOpts {
                    auth: Some(Auth::OAuth1(&self.keys)),
                    ..Default::default()
                },
            )
            .await
    }
}

use crate::news::types::{Article, EverythingResponse};
use autopost_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;

/// Parameters of a `GET /v2/everything` search.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub query: String,
    pub sort_by: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            query: "news".into(),
            sort_by: "publishedAt".into(),
            language: "jp".into(),
            page_size: 100,
        }
    }
}

#[derive(Clone)]
pub struct NewsApi {
    http: HttpClient,
    api_key: String,
}

impl NewsApi {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, HttpError> {
        let http = HttpClient::new(base_url)?;
        Ok(Self { http, api_key })
    }

    pub async fn everything(&self, query: &NewsQuery) -> Result<EverythingResponse, HttpError> {
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("q", query.query.as_str().into()),
            ("sortBy", query.sort_by.as_str().into()),
            ("language", query.language.as_str().into()),
            ("pageSize", query.page_size.clamp(1, 100).to_string().into()),
        ];

        let resp: EverythingResponse = self
            .http
            .get_json(
                "v2/everything",
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "apiKey",
                        value: Cow::Borrowed(&self.api_key),
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            total_results = ?resp.total_results,
            returned = resp.articles.len(),
            "news.everything.fetched"
        );
        Ok(resp)
    }

    /// Fetch and keep only articles with both a title and a description.
    pub async fn headlines(&self, query: &NewsQuery) -> Result<Vec<Article>, HttpError> {
        let resp = self.everything(query).await?;
        Ok(resp
            .articles
            .into_iter()
            .filter(|a| a.headline().is_some())
            .collect())
    }
}

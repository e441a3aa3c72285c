use autopost_http::StatusCode;
use autopost_http::oauth::OAuth1Keys;
use autopost_social::twitter::extract::{drop_referenced, index_media, media_urls};
use autopost_social::twitter::{TimelineQuery, TwitterApi};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn keys() -> OAuth1Keys {
    OAuth1Keys {
        consumer_key: "ck".into(),
        consumer_secret: "cs".into(),
        access_token: "at".into(),
        access_token_secret: "ats".into(),
    }
}

#[tokio::test]
async fn me_returns_the_account_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "777", "username": "bot", "name": "Bot" }
        })))
        .mount(&server)
        .await;

    let api = TwitterApi::new(&server.uri(), keys()).unwrap();
    let me = api.me().await.unwrap();
    assert_eq!(me.id, "777");
    assert_eq!(me.username.as_deref(), Some("bot"));
}

#[tokio::test]
async fn timeline_request_shapes_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/777/timelines/reverse_chronological"))
        .and(query_param("max_results", "50"))
        .and(query_param("exclude", "retweets,replies"))
        .and(query_param("expansions", "attachments.media_keys"))
        .and(query_param("media.fields", "url,type"))
        .and(query_param(
            "tweet.fields",
            "public_metrics,attachments,text,referenced_tweets",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "1", "text": "hello", "public_metrics": { "reply_count": 2 },
                  "attachments": { "media_keys": ["3_a"] } },
                { "id": "2", "text": "RT", "referenced_tweets": [{ "type": "retweeted", "id": "5" }] }
            ],
            "includes": { "media": [{ "media_key": "3_a", "type": "photo", "url": "https://img/a.jpg" }] },
            "meta": { "result_count": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = TwitterApi::new(&server.uri(), keys()).unwrap();
    let resp = api
        .home_timeline("777", &TimelineQuery::default())
        .await
        .unwrap();

    let index = index_media(resp.includes.as_ref());
    let kept = drop_referenced(resp.data.unwrap_or_default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].reply_count(), Some(2));
    assert_eq!(media_urls(&kept[0], &index), vec!["https://img/a.jpg"]);
}

#[tokio::test]
async fn timeline_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/777/timelines/reverse_chronological"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"title": "Too Many Requests"})))
        .mount(&server)
        .await;

    let api = TwitterApi::new(&server.uri(), keys()).unwrap();
    let err = api
        .home_timeline("777", &TimelineQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn create_post_sends_reply_reference() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({
            "text": "thanks!",
            "reply": { "in_reply_to_tweet_id": "1" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1000", "text": "thanks!" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = TwitterApi::new(&server.uri(), keys()).unwrap();
    let resp = api.create_post("thanks!", Some("1")).await.unwrap();
    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(resp.body.contains("1000"));
}

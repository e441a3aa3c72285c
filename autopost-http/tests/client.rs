use autopost_http::oauth::OAuth1Keys;
use autopost_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::borrow::Cow;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn keys() -> OAuth1Keys {
    OAuth1Keys {
        consumer_key: "ck".into(),
        consumer_secret: "cs".into(),
        access_token: "at".into(),
        access_token_secret: "ats".into(),
    }
}

#[tokio::test]
async fn get_json_appends_query_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "news"))
        .and(query_param("apiKey", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let got: Value = client
        .get_json(
            "v2/everything",
            RequestOpts {
                query: Some(vec![("q", "news".into())]),
                auth: Some(Auth::Query {
                    name: "apiKey",
                    value: Cow::Borrowed("secret-key"),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(got["status"], "ok");
}

#[tokio::test]
async fn oauth1_requests_carry_a_signed_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_exists("authorization"))
        .and(body_json(json!({"text": "hello"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "1"}})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let keys = keys();
    let resp = client
        .execute(
            Method::POST,
            "2/tweets",
            Some(&json!({"text": "hello"})),
            RequestOpts {
                auth: Some(Auth::OAuth1(&keys)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::CREATED);

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let auth = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_consumer_key=\"ck\""));
    assert!(auth.contains("oauth_token=\"at\""));
    assert!(!auth.contains("ats"));
}

#[tokio::test]
async fn execute_returns_non_success_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"errors": [{"detail": "duplicate content"}]})),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let resp = client
        .execute(
            Method::POST,
            "2/tweets",
            Some(&json!({"text": "x"})),
            RequestOpts::default(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_message(), "duplicate content");
    assert!(resp.body.contains("duplicate content"));
}

#[tokio::test]
async fn get_json_maps_failures_to_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<Value>("2/users/me", RequestOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    match err {
        HttpError::Api { message, body, .. } => {
            assert_eq!(message, "Unauthorized");
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<Value>("feed", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, _)));
}

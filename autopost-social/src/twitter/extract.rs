//! Client-side cleanup of timeline responses.
//!
//! The `exclude` parameter is not always honoured upstream, so reposts,
//! replies and quotes are filtered again here. Media attachments arrive as
//! keys into `includes.media` and are joined back onto each post.
use crate::twitter::types::{Includes, Media, Tweet};
use std::collections::HashMap;

/// Reference kinds that mark a post as not original content.
pub const REFERENCE_KINDS: [&str; 3] = ["retweeted", "replied_to", "quoted"];

/// `true` when the post references no other post as repost, reply or quote.
pub fn is_original(tweet: &Tweet) -> bool {
    tweet
        .referenced_tweets
        .as_deref()
        .unwrap_or_default()
        .iter()
        .all(|r| !REFERENCE_KINDS.contains(&r.kind.as_str()))
}

/// Drop every post carrying a repost/reply/quote reference, keeping order.
pub fn drop_referenced(tweets: Vec<Tweet>) -> Vec<Tweet> {
    let before = tweets.len();
    let kept: Vec<Tweet> = tweets.into_iter().filter(is_original).collect();
    if kept.len() != before {
        tracing::debug!(
            dropped = before - kept.len(),
            kept = kept.len(),
            "twitter.timeline.referenced_dropped"
        );
    }
    kept
}

/// Media lookup table keyed by `media_key`.
pub type MediaIndex = HashMap<String, Media>;

pub fn index_media(includes: Option<&Includes>) -> MediaIndex {
    includes
        .and_then(|i| i.media.as_ref())
        .map(|media| {
            media
                .iter()
                .map(|m| (m.media_key.clone(), m.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Attachment URLs for a post, in `media_keys` order. Keys that are missing
/// from the index, or media without a `url`, are skipped.
pub fn media_urls(tweet: &Tweet, index: &MediaIndex) -> Vec<String> {
    tweet
        .attachments
        .as_ref()
        .and_then(|a| a.media_keys.as_deref())
        .unwrap_or_default()
        .iter()
        .filter_map(|key| index.get(key))
        .filter_map(|m| m.url.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::types::TimelineResponse;
    use serde_json::json;

    fn timeline() -> TimelineResponse {
        serde_json::from_value(json!({
            "data": [
                { "id": "1", "text": "original", "public_metrics": { "reply_count": 3 },
                  "attachments": { "media_keys": ["3_b", "3_missing", "3_a"] } },
                { "id": "2", "text": "RT something",
                  "referenced_tweets": [{ "type": "retweeted", "id": "99" }] },
                { "id": "3", "text": "@bob yes",
                  "referenced_tweets": [{ "type": "replied_to", "id": "98" }] },
                { "id": "4", "text": "look at this",
                  "referenced_tweets": [{ "type": "quoted", "id": "97" }] },
                { "id": "5", "text": "no refs array", "referenced_tweets": [] }
            ],
            "includes": {
                "media": [
                    { "media_key": "3_a", "type": "photo", "url": "https://img.example/a.jpg" },
                    { "media_key": "3_b", "type": "photo", "url": "https://img.example/b.jpg" },
                    { "media_key": "3_v", "type": "video", "preview_image_url": "https://img.example/v.jpg" }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn referenced_posts_are_dropped() {
        let kept = drop_referenced(timeline().data.unwrap());
        let ids: Vec<&str> = kept.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
    }

    #[test]
    fn unknown_reference_kinds_are_kept() {
        let tweet: Tweet = serde_json::from_value(json!({
            "id": "9", "text": "t",
            "referenced_tweets": [{ "type": "something_new", "id": "1" }]
        }))
        .unwrap();
        assert!(is_original(&tweet));
    }

    #[test]
    fn media_join_keeps_key_order_and_skips_unresolved() {
        let resp = timeline();
        let index = index_media(resp.includes.as_ref());
        assert_eq!(index.len(), 3);

        let first = &resp.data.unwrap()[0];
        assert_eq!(
            media_urls(first, &index),
            vec!["https://img.example/b.jpg", "https://img.example/a.jpg"]
        );
    }

    #[test]
    fn no_includes_means_no_media() {
        let resp = timeline();
        let index = index_media(None);
        assert!(media_urls(&resp.data.unwrap()[0], &index).is_empty());
    }
}

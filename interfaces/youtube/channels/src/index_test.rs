use std::time::Duration;

use chrono::{TimeZone, Utc};
use reqwest::StatusCode;

use super::{classify_error, parse_channel_list, FetchChannelsError, YouTubeClient};

const CHANNEL_LIST: &str = r#"{
  "kind": "youtube#channelListResponse",
  "items": [
    {
      "id": "UCq-Fj5jknLsUf-MWSy4_brA",
      "snippet": {
        "title": "T-Series",
        "description": "Music can change the world.",
        "customUrl": "@tseries",
        "country": "IN",
        "publishedAt": "2006-03-13T14:27:05Z",
        "thumbnails": {
          "default": { "url": "https://yt3.example/default.jpg" },
          "high": { "url": "https://yt3.example/high.jpg" }
        }
      },
      "statistics": {
        "viewCount": "280000000000",
        "subscriberCount": "280000000",
        "hiddenSubscriberCount": false,
        "videoCount": "23000"
      }
    },
    {
      "id": "UChidden",
      "snippet": {
        "title": "Hidden",
        "thumbnails": { "medium": { "url": "https://yt3.example/medium.jpg" } }
      },
      "statistics": {
        "viewCount": "12",
        "hiddenSubscriberCount": true,
        "videoCount": "not-a-number"
      }
    }
  ]
}"#;

#[test]
fn parses_counts_and_picks_best_thumbnail() {
    let fetched_at = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
    let channels = parse_channel_list(CHANNEL_LIST, fetched_at).unwrap();

    assert_eq!(channels.len(), 2);

    let tseries = &channels[0];
    assert_eq!(tseries.channel_id, "UCq-Fj5jknLsUf-MWSy4_brA");
    assert_eq!(tseries.custom_url, "@tseries");
    assert_eq!(tseries.country.as_deref(), Some("IN"));
    assert_eq!(tseries.subscriber_count, 280_000_000);
    assert_eq!(tseries.view_count, 280_000_000_000);
    assert_eq!(tseries.video_count, 23_000);
    assert_eq!(tseries.thumbnail_url, "https://yt3.example/high.jpg");
    assert_eq!(tseries.fetched_at, fetched_at);
}

#[test]
fn missing_or_garbled_counts_become_zero() {
    let channels = parse_channel_list(CHANNEL_LIST, Utc::now()).unwrap();
    let hidden = &channels[1];

    assert!(hidden.hidden_subscriber_count);
    assert_eq!(hidden.subscriber_count, 0);
    assert_eq!(hidden.video_count, 0);
    assert_eq!(hidden.view_count, 12);
    assert_eq!(hidden.thumbnail_url, "https://yt3.example/medium.jpg");
    assert_eq!(hidden.description, "");
}

#[test]
fn empty_response_has_no_items() {
    let channels = parse_channel_list(r#"{"kind":"youtube#channelListResponse"}"#, Utc::now()).unwrap();
    assert!(channels.is_empty());
}

#[test]
fn malformed_body_is_a_deserialize_error() {
    let err = parse_channel_list("<html>", Utc::now()).unwrap_err();
    assert!(matches!(err, FetchChannelsError::DeserializeResponseBody { .. }));
}

#[test]
fn quota_errors_are_recognised() {
    let body = r#"{"error":{"code":403,"message":"quota","errors":[{"reason":"quotaExceeded","domain":"youtube.quota"}]}}"#;
    let err = classify_error(StatusCode::FORBIDDEN, body.to_string());
    assert!(matches!(err, FetchChannelsError::QuotaExceeded));
}

#[test]
fn invalid_key_is_recognised() {
    let body = r#"{"error":{"code":400,"message":"API key not valid","errors":[{"reason":"keyInvalid"}]}}"#;
    let err = classify_error(StatusCode::BAD_REQUEST, body.to_string());
    assert!(matches!(err, FetchChannelsError::KeyInvalid));
}

#[test]
fn other_failures_keep_status_and_message() {
    let body = r#"{"error":{"code":500,"message":"Backend Error","errors":[{"reason":"backendError"}]}}"#;
    match classify_error(StatusCode::INTERNAL_SERVER_ERROR, body.to_string()) {
        FetchChannelsError::UnexpectedStatus { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Backend Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    match classify_error(StatusCode::BAD_GATEWAY, "upstream down".to_string()) {
        FetchChannelsError::UnexpectedStatus { message, .. } => assert_eq!(message, "upstream down"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn transport_errors_never_carry_the_api_key() {
    let key = "SECRET_KEY_123";
    let client = YouTubeClient::new(key, Duration::from_secs(2))
        .unwrap()
        .with_endpoint("http://127.0.0.1:1/youtube/v3/channels");

    let err = client
        .fetch_channels(&["UC_a".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, FetchChannelsError::RequestSend { .. }));
    assert!(!err.to_string().contains(key));
    assert!(!format!("{err:?}").contains(key));
}

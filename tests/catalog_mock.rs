use std::{sync::Arc, time::Duration};

use httpmock::{Method::GET, MockServer};
use serde_json::json;
use songpick::config::ApiConfig;
use songpick::error::CatalogError;
use songpick::http::HttpPool;
use songpick::meting::CatalogClient;
use songpick::types::Source;

fn client(base: String, api_type: u8) -> CatalogClient {
    CatalogClient::new(
        Arc::new(HttpPool::new()),
        ApiConfig {
            api_url: base,
            custom_api_url: String::new(),
            api_type,
        },
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn search_sends_meting_query_and_keeps_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api")
                .query_param("server", "netease")
                .query_param("type", "search")
                .query_param("keywords", "七里香")
                .query_param_exists("_t");
            then.status(200).json_body(json!([
                { "title": "七里香", "author": "周杰伦", "url": "https://cdn.example.com/1.mp3" },
                { "title": "七里香 (Live)", "author": "周杰伦", "url": "https://cdn.example.com/2.mp3" },
                { "title": "七里香 Cover", "author": "Someone", "url": "https://cdn.example.com/3.mp3" }
            ]));
        })
        .await;

    let songs = client(server.base_url(), 1)
        .search("七里香", Source::Netease)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(songs.len(), 3);
    assert_eq!(songs[0].title, "七里香");
    assert_eq!(songs[1].title, "七里香 (Live)");
    assert_eq!(songs[2].author, "Someone");
}

#[tokio::test]
async fn direct_mode_uses_url_verbatim() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/meting/")
                .query_param("server", "kuwo")
                .query_param("type", "song")
                .query_param("id", "228908");
            then.status(200).json_body(json!([
                { "name": "晴天", "artist": "周杰伦", "url": "https://cdn.example.com/q.mp3" }
            ]));
        })
        .await;

    let song = client(server.url("/meting/"), 2)
        .lookup("228908", Source::Kuwo)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(song.title, "晴天");
    assert_eq!(song.id.as_deref(), Some("228908"));
    assert_eq!(song.source, Some(Source::Kuwo));
}

#[tokio::test]
async fn lookup_accepts_single_object() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api").query_param("type", "song");
            then.status(200).json_body(json!({
                "id": "12345",
                "title": "稻香",
                "author": "周杰伦",
                "url": "https://cdn.example.com/d.mp3"
            }));
        })
        .await;

    let song = client(server.base_url(), 1)
        .lookup("12345", Source::Netease)
        .await
        .unwrap();
    assert_eq!(song.title, "稻香");
    assert_eq!(song.play_url.as_deref(), Some("https://cdn.example.com/d.mp3"));
}

#[tokio::test]
async fn failures_are_errors_not_panics() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api").query_param("keywords", "down");
            then.status(502);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api").query_param("keywords", "html");
            then.status(200).body("<html>oops</html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api").query_param("keywords", "none");
            then.status(200).json_body(json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api").query_param("keywords", "weird");
            then.status(200).json_body(json!({ "error": "rate limited" }));
        })
        .await;

    let client = client(server.base_url(), 1);
    assert!(matches!(
        client.search("down", Source::Netease).await,
        Err(CatalogError::Status(502))
    ));
    assert!(matches!(
        client.search("html", Source::Netease).await,
        Err(CatalogError::Json(_))
    ));
    assert!(matches!(
        client.search("none", Source::Netease).await,
        Err(CatalogError::Empty)
    ));
    assert!(matches!(
        client.search("weird", Source::Netease).await,
        Err(CatalogError::Empty)
    ));
}

#[tokio::test]
async fn unconfigured_endpoint_is_reported() {
    let err = client(String::new(), 1)
        .search("anything", Source::Netease)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotConfigured));
}

#[tokio::test]
async fn slow_catalog_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(json!([]));
        })
        .await;

    let client = CatalogClient::new(
        Arc::new(HttpPool::new()),
        ApiConfig {
            api_url: server.base_url(),
            custom_api_url: String::new(),
            api_type: 1,
        },
        Duration::from_millis(100),
    );
    assert!(matches!(
        client.search("slow", Source::Netease).await,
        Err(CatalogError::Http(_))
    ));
}

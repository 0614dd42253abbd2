use std::{path::Path, sync::Arc, time::Duration};

use httpmock::{Method::GET, MockServer};
use songpick::download::Fetcher;
use songpick::error::FetchError;
use songpick::http::HttpPool;

fn fetcher(dir: &Path) -> Fetcher {
    Fetcher::new(Arc::new(HttpPool::new()), dir.to_path_buf())
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn streams_body_into_prefixed_temp_file() {
    let server = MockServer::start_async().await;
    let body: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/a.m4a");
            then.status(200)
                .header("content-type", "audio/mp4")
                .body(body.clone());
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = fetcher(dir.path())
        .fetch(&server.url("/a.m4a"), 1024 * 1024, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(file.size, body.len() as u64);
    assert_eq!(file.extension, ".m4a");
    assert!(file.path.starts_with(dir.path()));
    let name = file.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with(songpick::utils::TEMP_FILE_PREFIX));
    assert!(name.ends_with(".m4a"));
    assert_eq!(std::fs::read(&file.path).unwrap(), body);
}

#[tokio::test]
async fn unknown_content_type_defaults_to_mp3() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/a");
            then.status(200).body("ID3-not-really");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = fetcher(dir.path())
        .fetch(&server.url("/a"), 1024, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(file.extension, ".mp3");
}

#[tokio::test]
async fn declared_length_over_limit_is_rejected_before_writing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/big.flac");
            then.status(200)
                .header("content-type", "audio/flac")
                .body(vec![0u8; 4096]);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher(dir.path())
        .fetch(&server.url("/big.flac"), 1000, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::TooLarge {
            size: 4096,
            limit: 1000
        }
    ));
    assert!(err.is_size_limit());
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn non_200_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/moved.mp3");
            then.status(206).body("partial");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher(dir.path())
        .fetch(&server.url("/moved.mp3"), 1024, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status(206)));
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/empty.mp3");
            then.status(200).body("");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher(dir.path())
        .fetch(&server.url("/empty.mp3"), 1024, Duration::from_secs(5))
        .await
        .unwrap_err();

    // an empty body may be announced as zero length or not at all
    assert!(matches!(
        err,
        FetchError::EmptyBody | FetchError::UnknownLength
    ));
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn timeout_leaves_no_partial_file() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow.mp3");
            then.status(200)
                .delay(Duration::from_millis(800))
                .body(vec![1u8; 512]);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher(dir.path())
        .fetch(&server.url("/slow.mp3"), 1024, Duration::from_millis(100))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn closed_pool_refuses_to_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let http = Arc::new(HttpPool::new());
    http.close();

    let err = Fetcher::new(http, dir.path().to_path_buf())
        .fetch("https://example.com/a.mp3", 1024, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Closed));
}

#[tokio::test]
async fn redirect_hops_are_checked_against_url_policy() {
    let server = MockServer::start_async().await;
    let internal = server
        .mock_async(|when, then| {
            when.method(GET).path("/admin");
            then.status(200).body(vec![9u8; 64]);
        })
        .await;
    let target = format!("http://localhost:{}/admin", server.port());
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bounce.mp3");
            then.status(302).header("location", target.as_str());
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher(dir.path())
        .fetch(&server.url("/bounce.mp3"), 1024, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    internal.assert_hits_async(0).await;
    assert_eq!(file_count(dir.path()), 0);
}

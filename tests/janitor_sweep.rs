use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use songpick::management::{Janitor, SessionStore, sweep_temp_files};
use songpick::types::SongRecord;
use songpick::utils::TEMP_FILE_PREFIX;
use tokio_util::sync::CancellationToken;

fn song() -> SongRecord {
    SongRecord {
        id: Some("1".to_string()),
        source: None,
        title: "song".to_string(),
        author: String::new(),
        play_url: None,
        cover_url: None,
        lyric_url: None,
    }
}

fn touch(dir: &Path, name: &str, age: Duration) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
    path
}

#[tokio::test]
async fn sweep_without_age_removes_only_prefixed_files() {
    let dir = tempfile::tempdir().unwrap();
    let ours = touch(dir.path(), &format!("{}a.mp3", TEMP_FILE_PREFIX), Duration::ZERO);
    let theirs = touch(dir.path(), "other.mp3", Duration::ZERO);
    std::fs::create_dir(dir.path().join(format!("{}dir", TEMP_FILE_PREFIX))).unwrap();

    assert_eq!(sweep_temp_files(dir.path(), None).await.unwrap(), 1);
    assert!(!ours.exists());
    assert!(theirs.exists());
    assert!(dir.path().join(format!("{}dir", TEMP_FILE_PREFIX)).is_dir());
}

#[tokio::test]
async fn sweep_with_age_keeps_fresh_files() {
    let dir = tempfile::tempdir().unwrap();
    let stale = touch(
        dir.path(),
        &format!("{}stale.mp3", TEMP_FILE_PREFIX),
        Duration::from_secs(3600),
    );
    let fresh = touch(
        dir.path(),
        &format!("{}fresh.mp3", TEMP_FILE_PREFIX),
        Duration::ZERO,
    );

    let removed = sweep_temp_files(dir.path(), Some(Duration::from_secs(600)))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(!stale.exists());
    assert!(fresh.exists());
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(
        sweep_temp_files(&dir.path().join("nope"), None)
            .await
            .is_err()
    );
}

#[tokio::test(start_paused = true)]
async fn tick_evicts_expired_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let janitor = Janitor::new(
        Arc::clone(&store),
        dir.path().to_path_buf(),
        Duration::from_secs(60),
        Duration::from_secs(3600),
    );

    store.put("old", vec![song()]);
    tokio::time::advance(Duration::from_secs(40)).await;
    store.put("new", vec![song()]);
    tokio::time::advance(Duration::from_secs(30)).await;

    assert_eq!(janitor.tick().await, 1);
    assert!(store.peek("old").is_none());
    assert!(store.peek("new").is_some());
}

#[tokio::test]
async fn tick_survives_missing_temp_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let janitor = Janitor::new(
        store,
        dir.path().join("gone"),
        Duration::from_secs(1),
        Duration::from_secs(1),
    );
    assert_eq!(janitor.tick().await, 0);
}

#[tokio::test]
async fn cancellation_stops_the_loop_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let cancel = CancellationToken::new();
    let handle = Janitor::new(
        store,
        dir.path().to_path_buf(),
        Duration::from_secs(3600),
        Duration::from_secs(3600),
    )
    .spawn(cancel.clone());

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("janitor did not stop")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn spawned_loop_evicts_expired_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let cancel = CancellationToken::new();
    store.put("chat-1", vec![song()]);

    let handle = Janitor::new(
        Arc::clone(&store),
        dir.path().to_path_buf(),
        Duration::from_secs(60),
        Duration::from_secs(3600),
    )
    .spawn(cancel.clone());

    // the first tick at 60s still sees a live session
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(store.len(), 1);

    // the second tick at 120s evicts it
    tokio::time::sleep(Duration::from_secs(60)).await;
    for _ in 0..100 {
        if store.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(store.is_empty());

    cancel.cancel();
    handle.await.unwrap();
}

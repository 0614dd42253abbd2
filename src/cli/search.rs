use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::load_config,
    http::HttpPool,
    meting::CatalogClient,
    types::{SongTableRow, Source},
    warning,
};

pub async fn search(keyword: String, source: Option<Source>) {
    let config = load_config().await;
    let source = source.unwrap_or(config.default_source);

    let http = Arc::new(HttpPool::new());
    let catalog = CatalogClient::new(
        Arc::clone(&http),
        config.api_config.clone(),
        config.api_timeout(),
    );

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Searching {} for '{}'...", source, keyword));
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = catalog.search(&keyword, source).await;
    pb.finish_and_clear();
    http.close();

    match result {
        Ok(songs) => {
            let rows: Vec<SongTableRow> = songs
                .into_iter()
                .take(config.search_result_count)
                .enumerate()
                .map(|(i, song)| SongTableRow {
                    index: i + 1,
                    title: song.title,
                    author: song.author,
                    id: song.id.unwrap_or_default(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        Err(e) => warning!("No results for '{}'. Err: {}", keyword, e),
    }
}

use std::{path::PathBuf, sync::Arc};

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinSet,
};

use crate::{
    bot::Bot,
    cli::load_config,
    info, success,
    types::{Inbound, Outbound},
    warning,
};

pub async fn chat(conversation: String, save_to: Option<PathBuf>) {
    let config = load_config().await;
    let command = config.search_command.clone();
    let bot = Arc::new(Bot::start(config));

    let (tx, mut rx) = mpsc::channel::<Outbound>(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(event, save_to.as_ref()).await;
        }
    });

    info!(
        "Chatting as '{}'. Type /{} <song> to search, Ctrl-D to quit.",
        conversation, command
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut inflight = JoinSet::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let msg = Inbound {
                    conversation_id: conversation.clone(),
                    text: line,
                };
                let bot = Arc::clone(&bot);
                let tx = tx.clone();
                inflight.spawn(async move { bot.handle(&msg, &tx).await });
            }
            Ok(None) => break,
            Err(e) => {
                warning!("Cannot read input. Err: {}", e);
                break;
            }
        }
    }

    while inflight.join_next().await.is_some() {}
    drop(tx);
    let _ = printer.await;

    bot.shutdown().await;
    success!("Bye.");
}

async fn print_event(event: Outbound, save_to: Option<&PathBuf>) {
    match event {
        Outbound::Notice(text) | Outbound::Progress(text) => info!("{}", text),
        Outbound::Failure(text) => warning!("{}", text),
        Outbound::Attachment(file) => {
            success!("Received {} ({} bytes)", file.path.display(), file.size);
            let Some(dir) = save_to else {
                return;
            };
            let Some(name) = file.path.file_name() else {
                return;
            };
            let target = dir.join(name);
            match async_fs::copy(&file.path, &target).await {
                Ok(_) => success!("Saved to {}", target.display()),
                Err(e) => warning!("Cannot save {}. Err: {}", target.display(), e),
            }
        }
    }
}

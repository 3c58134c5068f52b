use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracker_engine::{HttpJobService, IndexJobRequest, TrackerHandle, TrackerView};
use tracker_logging::{tracker_info, tracker_warn};

use crate::config::AppConfig;
use crate::render;

/// A line typed on stdin while the tracker is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Dismiss(String),
    Refresh,
    Quit,
}

pub fn parse_command(line: &str) -> Option<UserCommand> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "d" | "dismiss" | "cancel" => UserCommand::Dismiss(words.next()?.to_string()),
        "r" | "refresh" => UserCommand::Refresh,
        "q" | "quit" | "exit" => UserCommand::Quit,
        _ => return None,
    };
    Some(command)
}

pub async fn run_app(
    config: AppConfig,
    track: Vec<String>,
    submission: Option<IndexJobRequest>,
) -> Result<()> {
    let service = HttpJobService::new(config.service_settings()).context("creating job service")?;
    let handle = TrackerHandle::spawn(Arc::new(service), config.tracker_settings());
    tracker_info!("tracking jobs at {}", config.api_base_url);

    for job_id in track {
        handle.register(job_id);
    }
    if let Some(request) = submission {
        let job_id = handle
            .submit(&request)
            .await
            .context("starting index job")?;
        println!("Started index job {job_id} for {}", request.collection_name);
    }

    let mut views = handle.subscribe();
    print_view(&views.borrow_and_update());

    let mut refresh = config.refresh_interval().map(|period| {
        let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticks
    });
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_view(&view);
            }
            _ = next_refresh(&mut refresh) => handle.refresh(),
            line = input.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(UserCommand::Dismiss(job_id)) => spawn_dismiss(&handle, job_id),
                    Some(UserCommand::Refresh) => handle.refresh(),
                    Some(UserCommand::Quit) => break,
                    None => println!("commands: dismiss <job_id> | refresh | quit"),
                },
                // stdin closed; keep watching until interrupted
                Ok(None) => stdin_open = false,
                Err(err) => {
                    tracker_warn!("stdin read failed: {}", err);
                    stdin_open = false;
                }
            },
        }
    }

    handle.shutdown();
    Ok(())
}

fn spawn_dismiss(handle: &TrackerHandle, job_id: String) {
    let handle = handle.clone();
    tokio::spawn(async move {
        match handle.dismiss(job_id.clone()).await {
            Ok(via) => println!("Dismissed {job_id} ({via:?})"),
            Err(err) => eprintln!("{err}"),
        }
    });
}

async fn next_refresh(refresh: &mut Option<Interval>) {
    match refresh {
        Some(ticks) => {
            ticks.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn print_view(view: &TrackerView) {
    for line in render::render(view, Local::now()) {
        println!("{line}");
    }
}

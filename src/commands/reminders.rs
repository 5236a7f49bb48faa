// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::prefs;
use crate::reminder::{
    ClickOutcome, Notification, Notifier, Scheduler, TerminalNotifier, next_fire_after, parse_push,
};
use crate::worker::{Worker, WorkerReply};
use anyhow::Result;
use chrono::Local;
use std::io::BufRead;
use std::sync::Arc;

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("watch", sub)) => {
            let windows: Vec<String> = sub
                .get_many::<String>("window")
                .unwrap_or_default()
                .cloned()
                .collect();
            watch(api, sub.get_one::<String>("origin").unwrap(), windows)?
        }
        Some(("enable", _)) => {
            TerminalNotifier.show(&Notification::enabled_confirmation());
            prefs::dismiss_notifications(api.conn())?;
            print_next();
            println!("Keep `khata reminders watch` running to receive the nightly reminder.");
        }
        Some(("next", _)) => print_next(),
        Some(("push", sub)) => {
            let n = parse_push(sub.get_one::<String>("payload").map(|s| s.as_str()));
            TerminalNotifier.show(&n);
        }
        _ => {}
    }
    Ok(())
}

fn print_next() {
    let next = next_fire_after(&Local::now());
    println!("Next reminder: {}", next.format("%d/%m/%Y %H:%M"));
}

/// Hosts the worker until killed. The reminder chain does not outlive this
/// process.
fn watch(api: &ApiClient, origin: &str, windows: Vec<String>) -> Result<()> {
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);
    let scheduler = Scheduler::new(Arc::clone(&notifier));
    let mut worker = Worker::start(api.offline_cache()?, scheduler, notifier, origin)?;
    for w in windows {
        worker.register_window(w);
    }
    tracing::info!(cache = %worker.cache().name(), "worker active");
    print_next();

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match worker.handle_line(&line) {
            Ok(WorkerReply::Scheduled) => print_next(),
            Ok(WorkerReply::Shown(_)) => {}
            Ok(WorkerReply::Click(ClickOutcome::Dismissed)) => println!("Notification dismissed"),
            Ok(WorkerReply::Click(ClickOutcome::Focused(w))) => println!("Focus {}", w),
            Ok(WorkerReply::Click(ClickOutcome::Opened(u))) => println!("Open {}", u),
            Err(err) => eprintln!("{:#}", err),
        }
    }

    // stdin closed; the timer thread keeps the reminder going
    tracing::debug!("message stream closed");
    while worker.scheduler().is_armed() {
        std::thread::park_timeout(std::time::Duration::from_secs(3600));
    }
    Ok(())
}

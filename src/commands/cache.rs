// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::prefs;
use crate::cache::{APP_SHELL, WorkerState};
use crate::utils::pretty_table;
use anyhow::{Context, Result};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    let mut cache = api.offline_cache()?;
    match m.subcommand() {
        Some(("install", _)) => {
            let urls: Vec<String> = APP_SHELL
                .iter()
                .map(|p| format!("{}{}", api.base(), p))
                .collect();
            let purged = cache
                .install(&api.fetcher()?, &urls)
                .context("Precache failed; nothing was stored")?;
            prefs::clear_install_dismissal(api.conn())?;
            println!(
                "Installed {} ({} views cached, {} old generations removed)",
                cache.name(),
                urls.len(),
                purged.len()
            );
        }
        Some(("activate", _)) => {
            let purged = cache.activate()?;
            if purged.is_empty() {
                println!("{} is active; nothing to purge", cache.name());
            } else {
                println!("{} is active; removed {}", cache.name(), purged.join(", "));
            }
        }
        Some(("status", _)) => {
            let rows: Vec<Vec<String>> = cache
                .stats()?
                .into_iter()
                .map(|(name, n)| {
                    let marker = match (name == cache.name(), cache.state()) {
                        (true, WorkerState::Active) => "active",
                        (true, _) => "current",
                        (false, _) => "stale",
                    };
                    vec![name, n.to_string(), marker.to_string()]
                })
                .collect();
            if rows.is_empty() {
                println!("No cache generations stored");
            } else {
                println!("{}", pretty_table(&["Cache", "Entries", "State"], rows));
            }
        }
        Some(("clear", _)) => {
            let n = cache.clear_all()?;
            println!("Removed {} cache generation(s)", n);
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::prefs::{self, DismissalFlags};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("status", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let flags = DismissalFlags::load(conn, Utc::now())?;
            if !maybe_print_json(json_flag, jsonl_flag, &flags)? {
                let rows = vec![
                    vec![
                        "install".to_string(),
                        if flags.install_dismissed { "dismissed (24h)" } else { "shown" }.into(),
                    ],
                    vec![
                        "notifications".to_string(),
                        if flags.notifications_dismissed { "dismissed" } else { "shown" }.into(),
                    ],
                ];
                println!("{}", pretty_table(&["Prompt", "State"], rows));
                if flags.all_dismissed() {
                    println!("Nothing left to prompt for");
                }
            }
        }
        Some(("dismiss-install", _)) => {
            prefs::dismiss_install(conn, Utc::now())?;
            println!("Install prompt hidden for 24 hours");
        }
        Some(("dismiss-notifications", _)) => {
            prefs::dismiss_notifications(conn)?;
            println!("Notification prompt hidden");
        }
        Some(("reset", _)) => {
            prefs::reset_dismissals(conn)?;
            println!("Prompt dismissals cleared");
        }
        _ => {}
    }
    Ok(())
}

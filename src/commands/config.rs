// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::base_url;
use crate::cache::current_cache_name;
use crate::utils::{get_setting, pretty_table, set_setting};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-api", sub)) => {
            let url = sub.get_one::<String>("url").unwrap().trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("API URL must start with http:// or https://");
            }
            set_setting(conn, "api_url", url.trim_end_matches('/'))?;
            println!("API URL set to {}", url);
        }
        Some(("show", _)) => {
            let logged_in = get_setting(conn, "token")?.is_some();
            let rows = vec![
                vec!["api_url".to_string(), base_url(conn)?],
                vec!["store".to_string(), crate::db::db_path()?.display().to_string()],
                vec!["cache".to_string(), current_cache_name()],
                vec!["logged_in".to_string(), logged_in.to_string()],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}

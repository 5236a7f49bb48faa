// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use khata::api::ApiClient;
use khata::{cli, commands, db};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    init_logging(matches.get_count("verbose"));

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("prompts", sub)) => commands::prompts::handle(&conn, sub)?,
        Some((name, sub)) => {
            let api = ApiClient::new(&conn)?;
            // a new release takes over from the previous cache generation
            match api.offline_cache().and_then(|mut c| c.ensure_active()) {
                Ok(purged) if !purged.is_empty() => {
                    tracing::info!(?purged, "old cache generations removed")
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "offline cache unavailable"),
            }
            match name {
                "auth" => commands::auth::handle(&api, sub)?,
                "products" => commands::products::handle(&api, sub)?,
                "buyers" => commands::buyers::handle(&api, sub)?,
                "purchases" => commands::purchases::handle(&api, sub)?,
                "sales" => commands::sales::handle(&api, sub)?,
                "expenses" => commands::expenses::handle(&api, sub)?,
                "analytics" => commands::analytics::handle(&api, sub)?,
                "cache" => commands::cache::handle(&api, sub)?,
                "reminders" => commands::reminders::handle(&api, sub)?,
                _ => {
                    cli::build_cli().print_help()?;
                    println!();
                }
            }
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

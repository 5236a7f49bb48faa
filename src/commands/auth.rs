// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::models::User;
use crate::prefs;
use anyhow::Result;

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("login", sub)) => {
            let email = sub.get_one::<String>("email").unwrap().trim();
            let password = sub.get_one::<String>("password").unwrap();
            api.login(email, password)?;
            println!("Logged in as {}", email);
        }
        Some(("logout", _)) => {
            prefs::clear_token(api.conn())?;
            println!("Logged out");
        }
        Some(("whoami", _)) => {
            let me: User = api.get("/auth/me")?;
            println!(
                "{} <{}>{}",
                me.full_name.as_deref().unwrap_or("(no name)"),
                me.email,
                if me.is_admin { " [admin]" } else { "" }
            );
        }
        Some(("change-password", sub)) => {
            let old = sub.get_one::<String>("old").unwrap();
            let new = sub.get_one::<String>("new").unwrap();
            api.change_password(old, new)?;
            println!("Password changed");
        }
        _ => {}
    }
    Ok(())
}

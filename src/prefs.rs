// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side persisted state: the bearer token and the two prompt
//! dismissal flags.
//!
//! The flags are read once at startup. The install-prompt dismissal lapses
//! 24 hours after it was recorded and is removed when found expired or once
//! the cache installs successfully; the notification-prompt dismissal is
//! permanent until reset.

use crate::utils::{get_setting, remove_setting, set_setting};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::Connection;
use serde::Serialize;

const TOKEN_KEY: &str = "token";
const INSTALL_DISMISSED_KEY: &str = "pwa-install-dismissed";
const NOTIF_DISMISSED_KEY: &str = "pwa-notif-dismissed";

pub fn token(conn: &Connection) -> rusqlite::Result<Option<String>> {
    get_setting(conn, TOKEN_KEY)
}

pub fn set_token(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    set_setting(conn, TOKEN_KEY, token)
}

pub fn clear_token(conn: &Connection) -> rusqlite::Result<()> {
    remove_setting(conn, TOKEN_KEY)
}

pub fn install_dismissal_ttl() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DismissalFlags {
    pub install_dismissed: bool,
    pub notifications_dismissed: bool,
}

impl DismissalFlags {
    /// Read both flags as of `now`, dropping an expired install dismissal.
    pub fn load(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<Self> {
        let install_dismissed = match get_setting(conn, INSTALL_DISMISSED_KEY)? {
            Some(raw) => {
                let at = raw
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
                match at {
                    Some(at) if now - at < install_dismissal_ttl() => true,
                    _ => {
                        remove_setting(conn, INSTALL_DISMISSED_KEY)?;
                        tracing::debug!("install prompt dismissal expired");
                        false
                    }
                }
            }
            None => false,
        };
        let notifications_dismissed =
            get_setting(conn, NOTIF_DISMISSED_KEY)?.as_deref() == Some("true");
        Ok(Self {
            install_dismissed,
            notifications_dismissed,
        })
    }

    /// Nothing left to prompt for.
    pub fn all_dismissed(&self) -> bool {
        self.install_dismissed && self.notifications_dismissed
    }
}

pub fn dismiss_install(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<()> {
    set_setting(
        conn,
        INSTALL_DISMISSED_KEY,
        &now.timestamp_millis().to_string(),
    )
}

pub fn dismiss_notifications(conn: &Connection) -> rusqlite::Result<()> {
    set_setting(conn, NOTIF_DISMISSED_KEY, "true")
}

/// The app is installed; the install prompt has nothing left to offer.
pub fn clear_install_dismissal(conn: &Connection) -> rusqlite::Result<()> {
    remove_setting(conn, INSTALL_DISMISSED_KEY)
}

/// Forget both dismissals.
pub fn reset_dismissals(conn: &Connection) -> rusqlite::Result<()> {
    clear_install_dismissal(conn)?;
    remove_setting(conn, NOTIF_DISMISSED_KEY)
}

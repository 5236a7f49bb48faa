// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, TimeZone, Utc};
use khata::db::init_schema;
use khata::prefs::{self, DismissalFlags};
use khata::utils::get_setting;
use rusqlite::Connection;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

#[test]
fn install_dismissal_lapses_after_a_day() {
    let conn = conn();
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    prefs::dismiss_install(&conn, at).unwrap();

    let soon = DismissalFlags::load(&conn, at + Duration::hours(23)).unwrap();
    assert!(soon.install_dismissed);

    let later = DismissalFlags::load(&conn, at + Duration::hours(25)).unwrap();
    assert!(!later.install_dismissed);
    assert!(get_setting(&conn, "pwa-install-dismissed").unwrap().is_none());
}

#[test]
fn notification_dismissal_is_permanent_until_reset() {
    let conn = conn();
    let now = Utc::now();
    prefs::dismiss_notifications(&conn).unwrap();
    prefs::dismiss_install(&conn, now).unwrap();

    let flags = DismissalFlags::load(&conn, now + Duration::days(30)).unwrap();
    assert!(flags.notifications_dismissed);
    assert!(!flags.all_dismissed());

    prefs::reset_dismissals(&conn).unwrap();
    let flags = DismissalFlags::load(&conn, now).unwrap();
    assert!(!flags.notifications_dismissed);
    assert!(!flags.install_dismissed);
}

#[test]
fn garbage_timestamp_counts_as_expired() {
    let conn = conn();
    khata::utils::set_setting(&conn, "pwa-install-dismissed", "yesterday").unwrap();
    let flags = DismissalFlags::load(&conn, Utc::now()).unwrap();
    assert!(!flags.install_dismissed);
}

#[test]
fn token_round_trips_through_settings() {
    let conn = conn();
    assert!(prefs::token(&conn).unwrap().is_none());
    prefs::set_token(&conn, "abc").unwrap();
    assert_eq!(prefs::token(&conn).unwrap().as_deref(), Some("abc"));
    prefs::clear_token(&conn).unwrap();
    assert!(prefs::token(&conn).unwrap().is_none());
}

#[test]
fn clearing_install_dismissal_keeps_the_notification_flag() {
    let conn = conn();
    let now = Utc::now();
    prefs::dismiss_install(&conn, now).unwrap();
    prefs::dismiss_notifications(&conn).unwrap();
    assert!(DismissalFlags::load(&conn, now).unwrap().all_dismissed());

    prefs::clear_install_dismissal(&conn).unwrap();
    let flags = DismissalFlags::load(&conn, now).unwrap();
    assert!(!flags.install_dismissed);
    assert!(flags.notifications_dismissed);
}

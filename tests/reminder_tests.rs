// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{FixedOffset, TimeZone};
use khata::cache::{OfflineCache, WorkerState};
use khata::db::init_schema;
use khata::reminder::{
    ClickOutcome, DEFAULT_TAG, Notification, Notifier, Scheduler, handle_click, next_fire_after,
    parse_push,
};
use khata::worker::{Worker, WorkerMessage, WorkerReply};
use rusqlite::Connection;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
}

struct ChannelNotifier(Mutex<Sender<Notification>>);

impl Notifier for ChannelNotifier {
    fn show(&self, n: &Notification) {
        let _ = self.0.lock().unwrap().send(n.clone());
    }
}

fn channel_notifier() -> (Arc<dyn Notifier>, mpsc::Receiver<Notification>) {
    let (tx, rx) = mpsc::channel();
    (Arc::new(ChannelNotifier(Mutex::new(tx))), rx)
}

#[test]
fn evening_fires_the_same_night() {
    let now = ist().with_ymd_and_hms(2024, 5, 1, 21, 0, 0).unwrap();
    let next = next_fire_after(&now);
    assert_eq!(next, ist().with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap());
    assert_eq!(next - now, chrono::Duration::hours(1));
}

#[test]
fn late_night_fires_tomorrow() {
    let now = ist().with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
    assert_eq!(
        next_fire_after(&now),
        ist().with_ymd_and_hms(2024, 5, 2, 22, 0, 0).unwrap()
    );
}

#[test]
fn scheduler_rearms_after_each_fire() {
    let (notifier, rx) = channel_notifier();
    let sched = Scheduler::with_delay(notifier, Arc::new(|| Duration::from_millis(20)));
    sched.arm();
    for _ in 0..2 {
        let n = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(n.tag, DEFAULT_TAG);
        assert!(n.require_interaction);
    }
    assert!(sched.is_armed());
    sched.disarm();
    assert!(!sched.is_armed());
}

#[test]
fn rearming_replaces_the_pending_chain() {
    let (notifier, rx) = channel_notifier();
    let sched = Scheduler::with_delay(notifier, Arc::new(|| Duration::from_millis(300)));
    sched.arm();
    sched.arm();
    sched.arm();
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    // a single chain delivers at most one notice per period
    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    sched.disarm();
}

#[test]
fn push_without_data_uses_the_default_reminder() {
    let n = parse_push(None);
    assert_eq!(n.title, "📋 Kastbhanjan - Daily Reminder");
    assert_eq!(n.body, "Please add today's entries!");
    assert_eq!(n.tag, DEFAULT_TAG);
    assert_eq!(n.url, "/");
    assert_eq!(n.actions.len(), 2);
}

#[test]
fn push_fields_override_defaults_and_bad_json_is_ignored() {
    let n = parse_push(Some(r#"{"title":"Stock check","url":"/purchases"}"#));
    assert_eq!(n.title, "Stock check");
    assert_eq!(n.body, "Please add today's entries!");
    assert_eq!(n.url, "/purchases");

    let fallback = parse_push(Some("not json"));
    assert_eq!(fallback, parse_push(None));
}

#[test]
fn click_focuses_an_open_window_or_opens_one() {
    let origin = "http://localhost:5173";
    let open = vec!["http://localhost:5173/sales".to_string()];
    assert_eq!(
        handle_click(Some("open"), origin, &open, "/"),
        ClickOutcome::Focused("http://localhost:5173/sales".into())
    );
    let other = vec!["https://example.com/".to_string()];
    assert_eq!(
        handle_click(None, origin, &other, "/buyers"),
        ClickOutcome::Opened("http://localhost:5173/buyers".into())
    );
}

#[test]
fn worker_messages_parse_from_json_lines() {
    let msg: WorkerMessage = serde_json::from_str(r#"{"type":"SCHEDULE_NOTIFICATION"}"#).unwrap();
    assert_eq!(msg, WorkerMessage::ScheduleNotification);

    let msg: WorkerMessage =
        serde_json::from_str(r#"{"type":"NOTIFICATION_CLICK","action":"dismiss"}"#).unwrap();
    assert_eq!(
        msg,
        WorkerMessage::NotificationClick {
            action: Some("dismiss".into()),
            url: None
        }
    );

    assert!(serde_json::from_str::<WorkerMessage>(r#"{"type":"SKIP_WAITING"}"#).is_err());
}

#[test]
fn worker_start_activates_cache_and_handles_messages() {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    OfflineCache::new(&conn, "khata-v0").unwrap().put("http://x/a", &khata::cache::CachedResponse {
        status: 200,
        content_type: None,
        body: b"{}".to_vec(),
    })
    .unwrap();

    let (notifier, rx) = channel_notifier();
    let sched = Scheduler::with_delay(Arc::clone(&notifier), Arc::new(|| Duration::from_secs(3600)));
    let cache = OfflineCache::new(&conn, "khata-v1").unwrap();
    let mut worker = Worker::start(cache, sched, notifier, "http://localhost:5173").unwrap();

    assert_eq!(worker.cache().state(), WorkerState::Active);
    assert_eq!(worker.cache().keys().unwrap(), vec!["khata-v1".to_string()]);
    assert!(worker.scheduler().is_armed());

    let reply = worker
        .handle_line(r#"{"type":"PUSH","payload":{"body":"Close the day"}}"#)
        .unwrap();
    let shown = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(reply, WorkerReply::Shown(shown.clone()));
    assert_eq!(shown.body, "Close the day");

    let first = worker
        .handle_line(r#"{"type":"NOTIFICATION_CLICK","action":"open","url":"/"}"#)
        .unwrap();
    assert_eq!(
        first,
        WorkerReply::Click(ClickOutcome::Opened("http://localhost:5173/".into()))
    );
    let second = worker.handle_line(r#"{"type":"NOTIFICATION_CLICK"}"#).unwrap();
    assert_eq!(
        second,
        WorkerReply::Click(ClickOutcome::Focused("http://localhost:5173/".into()))
    );

    assert_eq!(
        worker.handle_line(r#"{"type":"SCHEDULE_NOTIFICATION"}"#).unwrap(),
        WorkerReply::Scheduled
    );
    assert!(worker.handle_line("garbage").is_err());
}

#[test]
fn click_does_not_focus_a_window_on_a_lookalike_origin() {
    let origin = "http://localhost:5173";
    let lookalikes = vec![
        "http://localhost:51730/".to_string(),
        "https://localhost:5173/".to_string(),
        "http://localhost:5173.evil.test/".to_string(),
    ];
    assert_eq!(
        handle_click(None, origin, &lookalikes, "/"),
        ClickOutcome::Opened("http://localhost:5173/".into())
    );
    assert_eq!(
        handle_click(None, "http://localhost:5173/", &[], "/sales"),
        ClickOutcome::Opened("http://localhost:5173/sales".into())
    );
}

#[test]
fn worker_focuses_a_registered_window() {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let (notifier, _rx) = channel_notifier();
    let sched = Scheduler::with_delay(Arc::clone(&notifier), Arc::new(|| Duration::from_secs(3600)));
    let cache = OfflineCache::new(&conn, "khata-v1").unwrap();
    let mut worker = Worker::start(cache, sched, notifier, "http://localhost:5173").unwrap();
    worker.register_window("http://localhost:51730/");
    worker.register_window("http://localhost:5173/buyers/4");

    let reply = worker.handle_line(r#"{"type":"NOTIFICATION_CLICK"}"#).unwrap();
    assert_eq!(
        reply,
        WorkerReply::Click(ClickOutcome::Focused("http://localhost:5173/buyers/4".into()))
    );
}

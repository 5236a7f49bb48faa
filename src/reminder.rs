// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily entry reminder.
//!
//! Server push is the primary delivery path. The local scheduler is a best
//! effort fallback: it lives only as long as the hosting process and must be
//! armed again (by a `SCHEDULE_NOTIFICATION` message or a fresh worker start)
//! after a restart.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub const REMINDER_HOUR: u32 = 22;
pub const DEFAULT_TAG: &str = "daily-reminder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub url: String,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
}

fn actions(done_label: &str) -> Vec<NotificationAction> {
    vec![
        NotificationAction {
            action: "open".into(),
            title: "📂 Open App".into(),
        },
        NotificationAction {
            action: "dismiss".into(),
            title: done_label.into(),
        },
    ]
}

impl Notification {
    pub fn daily_reminder() -> Self {
        Self {
            title: "📋 Kastbhanjan - Daily Entry Reminder".into(),
            body: "Please add today's purchases, sales and expenses before sleeping! 🌙".into(),
            tag: DEFAULT_TAG.into(),
            url: "/".into(),
            require_interaction: true,
            actions: actions("✓ Already Done"),
        }
    }

    pub fn enabled_confirmation() -> Self {
        Self {
            title: "✅ Notifications Enabled!".into(),
            body: "You will get a reminder every night at 10:00 PM to add daily entries.".into(),
            tag: "setup-confirm".into(),
            url: "/".into(),
            require_interaction: false,
            actions: Vec::new(),
        }
    }
}

/// Wire shape of a server push; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag: Option<String>,
    pub url: Option<String>,
}

impl From<PushPayload> for Notification {
    fn from(p: PushPayload) -> Self {
        Self {
            title: p
                .title
                .unwrap_or_else(|| "📋 Kastbhanjan - Daily Reminder".into()),
            body: p.body.unwrap_or_else(|| "Please add today's entries!".into()),
            tag: p.tag.unwrap_or_else(|| DEFAULT_TAG.into()),
            url: p.url.unwrap_or_else(|| "/".into()),
            require_interaction: true,
            actions: actions("✓ Done"),
        }
    }
}

/// Build the notification for a push message. Missing or unparsable data
/// falls back to the default reminder text.
pub fn parse_push(data: Option<&str>) -> Notification {
    let payload = match data {
        Some(raw) => serde_json::from_str::<PushPayload>(raw).unwrap_or_else(|err| {
            tracing::warn!(%err, "push payload is not valid JSON; using defaults");
            PushPayload::default()
        }),
        None => PushPayload::default(),
    };
    payload.into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Dismissed,
    Focused(String),
    Opened(String),
}

/// `dismiss` closes without navigating; anything else focuses an open
/// window on the same origin (scheme, host and port) or opens a new one.
pub fn handle_click(
    action: Option<&str>,
    origin: &str,
    open_windows: &[String],
    url: &str,
) -> ClickOutcome {
    if action == Some("dismiss") {
        return ClickOutcome::Dismissed;
    }
    let app = Url::parse(origin).ok().map(|u| u.origin());
    let same_origin = |w: &&String| match (&app, Url::parse(w)) {
        (Some(app), Ok(win)) => win.origin() == *app,
        _ => false,
    };
    match open_windows.iter().find(same_origin) {
        Some(w) => ClickOutcome::Focused(w.clone()),
        None => ClickOutcome::Opened(format!("{}{}", origin.trim_end_matches('/'), url)),
    }
}

fn reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(REMINDER_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn local_at<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Tz> {
    let naive = day.and_time(reminder_time());
    tz.from_local_datetime(&naive)
        .earliest()
        // spring-forward gap: first valid instant after the nominal time
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Next 22:00 in `now`'s time zone: today if it is still ahead, else
/// tomorrow.
pub fn next_fire_after<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = local_at(&tz, today);
    if *now < candidate {
        return candidate;
    }
    let tomorrow = today.succ_opt().unwrap_or(today);
    local_at(&tz, tomorrow)
}

fn wall_clock_delay() -> std::time::Duration {
    let now = Local::now();
    let next = next_fire_after(&now);
    (next - now).to_std().unwrap_or_default()
}

pub trait Notifier: Send + Sync {
    fn show(&self, n: &Notification);
}

/// Prints notifications to the terminal.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn show(&self, n: &Notification) {
        tracing::info!(tag = %n.tag, title = %n.title, "notification");
        println!("🔔 {}\n   {}", n.title, n.body);
        if !n.actions.is_empty() {
            let labels: Vec<String> = n
                .actions
                .iter()
                .map(|a| format!("[{}] {}", a.action, a.title))
                .collect();
            println!("   {}", labels.join("  "));
        }
    }
}

type DelayFn = dyn Fn() -> std::time::Duration + Send + Sync;

struct Chain {
    cancel: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Self-rearming single-shot timer. Each fire shows the daily reminder and
/// recomputes the next delay from the clock, so it tracks wall time across
/// DST and clock changes. At most one chain is pending at a time.
pub struct Scheduler {
    notifier: Arc<dyn Notifier>,
    delay: Arc<DelayFn>,
    pending: Mutex<Option<Chain>>,
}

impl Scheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_delay(notifier, Arc::new(wall_clock_delay))
    }

    pub fn with_delay(notifier: Arc<dyn Notifier>, delay: Arc<DelayFn>) -> Self {
        Self {
            notifier,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Arm the chain, replacing any pending one.
    pub fn arm(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = pending.take() {
            stop(old);
        }
        let (tx, rx) = mpsc::channel::<()>();
        let notifier = Arc::clone(&self.notifier);
        let delay = Arc::clone(&self.delay);
        let handle = std::thread::spawn(move || {
            loop {
                let wait = delay();
                tracing::debug!(secs = wait.as_secs(), "reminder armed");
                match rx.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => notifier.show(&Notification::daily_reminder()),
                    _ => break,
                }
            }
        });
        *pending = Some(Chain { cancel: tx, handle });
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.as_ref().is_some_and(|c| !c.handle.is_finished()))
            .unwrap_or(false)
    }

    pub fn disarm(&self) {
        let chain = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(c) = chain {
            stop(c);
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

fn stop(chain: Chain) {
    let _ = chain.cancel.send(());
    if chain.handle.join().is_err() {
        tracing::warn!("reminder thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    #[test]
    fn exactly_ten_pm_rolls_to_tomorrow() {
        let now = ist().with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap();
        let next = next_fire_after(&now);
        assert_eq!(next, ist().with_ymd_and_hms(2024, 5, 2, 22, 0, 0).unwrap());
    }

    #[test]
    fn month_end_rolls_over() {
        let now = ist().with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
        let next = next_fire_after(&now);
        assert_eq!(next, ist().with_ymd_and_hms(2024, 2, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn dismiss_action_never_navigates() {
        let windows = vec!["http://localhost:5173/buyers".to_string()];
        assert_eq!(
            handle_click(Some("dismiss"), "http://localhost:5173", &windows, "/"),
            ClickOutcome::Dismissed
        );
    }
}

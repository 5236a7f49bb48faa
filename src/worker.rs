// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::OfflineCache;
use crate::reminder::{ClickOutcome, Notification, Notifier, Scheduler, handle_click, parse_push};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Messages accepted by the worker, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    ScheduleNotification,
    Push {
        #[serde(default)]
        payload: Option<Value>,
    },
    NotificationClick {
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerReply {
    Scheduled,
    Shown(Notification),
    Click(ClickOutcome),
}

/// Background host for the offline cache generation, the reminder chain
/// and push/click handling.
pub struct Worker<'a> {
    cache: OfflineCache<'a>,
    scheduler: Scheduler,
    notifier: Arc<dyn Notifier>,
    origin: String,
    windows: Vec<String>,
}

impl<'a> Worker<'a> {
    /// Activate the cache generation and arm the reminder.
    pub fn start(
        mut cache: OfflineCache<'a>,
        scheduler: Scheduler,
        notifier: Arc<dyn Notifier>,
        origin: impl Into<String>,
    ) -> Result<Self> {
        let purged = cache.ensure_active().context("activate offline cache")?;
        if !purged.is_empty() {
            tracing::info!(?purged, "old cache generations removed");
        }
        scheduler.arm();
        Ok(Self {
            cache,
            scheduler,
            notifier,
            origin: origin.into(),
            windows: Vec::new(),
        })
    }

    pub fn cache(&self) -> &OfflineCache<'a> {
        &self.cache
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Windows already open on the app origin, used when a click arrives.
    pub fn register_window(&mut self, url: impl Into<String>) {
        self.windows.push(url.into());
    }

    pub fn handle(&mut self, msg: WorkerMessage) -> WorkerReply {
        match msg {
            WorkerMessage::ScheduleNotification => {
                self.scheduler.arm();
                WorkerReply::Scheduled
            }
            WorkerMessage::Push { payload } => {
                let n = match payload {
                    Some(Value::String(raw)) => parse_push(Some(&raw)),
                    Some(v) => parse_push(Some(&v.to_string())),
                    None => parse_push(None),
                };
                self.notifier.show(&n);
                WorkerReply::Shown(n)
            }
            WorkerMessage::NotificationClick { action, url } => {
                let url = url.unwrap_or_else(|| "/".into());
                let outcome = handle_click(action.as_deref(), &self.origin, &self.windows, &url);
                if let ClickOutcome::Opened(ref u) = outcome {
                    self.windows.push(u.clone());
                }
                WorkerReply::Click(outcome)
            }
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Result<WorkerReply> {
        let msg: WorkerMessage = serde_json::from_str(line.trim())
            .with_context(|| format!("Unrecognised worker message: {}", line.trim()))?;
        Ok(self.handle(msg))
    }
}

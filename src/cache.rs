// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Offline response cache.
//!
//! Responses to GET requests are kept in a named, versioned cache inside the
//! local SQLite store. Only one generation is live: activating the current
//! one purges every other. Lookups are network first; the cache is consulted
//! only when the network fails.

use crate::error::ApiError;
use crate::utils::{get_setting, remove_setting, set_setting};
use reqwest::Method;
use rusqlite::{Connection, OptionalExtension, params};

/// GET endpoints precached on install so the basic views work offline.
pub const APP_SHELL: [&str; 4] = [
    "/auth/me",
    "/product-types",
    "/buyers/list",
    "/analytics/dashboard-summary",
];

const ACTIVE_KEY: &str = "active_cache";

/// A new release is a new cache generation.
pub fn current_cache_name() -> String {
    format!("khata-v{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
}

#[derive(Debug, Clone)]
pub struct Fetched {
    pub response: CachedResponse,
    pub source: Source,
}

/// The network side of a fetch. `Err` means the request never produced a
/// response (connection refused, DNS, timeout); HTTP error statuses are `Ok`.
pub trait Fetch {
    fn fetch(&self, req: &Request) -> Result<CachedResponse, ApiError>;
}

pub struct OfflineCache<'a> {
    conn: &'a Connection,
    name: String,
    state: WorkerState,
}

impl<'a> OfflineCache<'a> {
    pub fn new(conn: &'a Connection, name: impl Into<String>) -> Result<Self, ApiError> {
        let name = name.into();
        let active = get_setting(conn, ACTIVE_KEY)?;
        let state = if active.as_deref() == Some(name.as_str()) {
            WorkerState::Active
        } else {
            WorkerState::Installing
        };
        Ok(Self { conn, name, state })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Precache `urls`, then activate without waiting. Either every URL is
    /// stored or none is.
    pub fn install(&mut self, net: &dyn Fetch, urls: &[String]) -> Result<Vec<String>, ApiError> {
        self.state = WorkerState::Installing;
        let mut fetched = Vec::with_capacity(urls.len());
        for url in urls {
            let resp = net.fetch(&Request::get(url.clone()))?;
            if !resp.is_success() {
                return Err(ApiError::Status {
                    status: resp.status,
                    detail: format!("precache of {} failed", url),
                });
            }
            fetched.push((url, resp));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO caches(name) VALUES (?1)",
            params![self.name],
        )?;
        for (url, resp) in &fetched {
            store(&tx, &self.name, url, resp)?;
        }
        tx.commit()?;
        tracing::info!(cache = %self.name, assets = fetched.len(), "installed");
        self.state = WorkerState::Installed;

        self.activate()
    }

    /// Delete every cache generation other than this one and claim it as
    /// active. Returns the deleted names.
    pub fn activate(&mut self) -> Result<Vec<String>, ApiError> {
        self.state = WorkerState::Activating;
        self.conn.execute(
            "INSERT OR IGNORE INTO caches(name) VALUES (?1)",
            params![self.name],
        )?;
        let stale: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|k| k != &self.name)
            .collect();
        for k in &stale {
            self.delete(k)?;
        }
        set_setting(self.conn, ACTIVE_KEY, &self.name)?;
        self.state = WorkerState::Active;
        tracing::info!(cache = %self.name, purged = stale.len(), "activated");
        Ok(stale)
    }

    /// Activate when a previous generation is still recorded as live.
    pub fn ensure_active(&mut self) -> Result<Vec<String>, ApiError> {
        if self.state == WorkerState::Active {
            return Ok(Vec::new());
        }
        self.activate()
    }

    pub fn keys(&self) -> Result<Vec<String>, ApiError> {
        let mut stmt = self.conn.prepare("SELECT name FROM caches ORDER BY name")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete(&self, name: &str) -> Result<bool, ApiError> {
        self.conn
            .execute("DELETE FROM cache_entries WHERE cache_name=?1", params![name])?;
        let n = self
            .conn
            .execute("DELETE FROM caches WHERE name=?1", params![name])?;
        Ok(n > 0)
    }

    /// Drop every generation, including this one.
    pub fn clear_all(&mut self) -> Result<usize, ApiError> {
        let names = self.keys()?;
        for k in &names {
            self.delete(k)?;
        }
        remove_setting(self.conn, ACTIVE_KEY)?;
        self.state = WorkerState::Installing;
        Ok(names.len())
    }

    pub fn put(&self, url: &str, resp: &CachedResponse) -> Result<(), ApiError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO caches(name) VALUES (?1)",
            params![self.name],
        )?;
        store(self.conn, &self.name, url, resp)?;
        Ok(())
    }

    pub fn lookup(&self, url: &str) -> Result<Option<CachedResponse>, ApiError> {
        let hit = self
            .conn
            .query_row(
                "SELECT status, content_type, body FROM cache_entries WHERE cache_name=?1 AND url=?2",
                params![self.name, url],
                |r| {
                    Ok(CachedResponse {
                        status: r.get(0)?,
                        content_type: r.get(1)?,
                        body: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(hit)
    }

    /// Per-generation entry counts, for `cache status`.
    pub fn stats(&self) -> Result<Vec<(String, i64)>, ApiError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, COUNT(e.url) FROM caches c
             LEFT JOIN cache_entries e ON e.cache_name=c.name
             GROUP BY c.name ORDER BY c.name",
        )?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Network first, cache as fallback. Non-GET requests are not
    /// intercepted. Writing the cache copy is best effort.
    pub fn handle_fetch(&self, req: &Request, net: &dyn Fetch) -> Result<Fetched, ApiError> {
        if req.method != Method::GET {
            return net.fetch(req).map(|response| Fetched {
                response,
                source: Source::Network,
            });
        }
        self.settle(req, net.fetch(req))
    }

    /// Apply the network-first policy to a GET whose network outcome is
    /// already known.
    pub fn settle(
        &self,
        req: &Request,
        outcome: Result<CachedResponse, ApiError>,
    ) -> Result<Fetched, ApiError> {
        match outcome {
            Ok(response) => {
                if response.is_success() {
                    if let Err(err) = self.put(&req.url, &response) {
                        tracing::warn!(url = %req.url, %err, "cache write failed");
                    }
                }
                Ok(Fetched {
                    response,
                    source: Source::Network,
                })
            }
            Err(net_err) => match self.lookup(&req.url) {
                Ok(Some(response)) => {
                    tracing::info!(url = %req.url, %net_err, "served from offline cache");
                    Ok(Fetched {
                        response,
                        source: Source::Cache,
                    })
                }
                Ok(None) => {
                    tracing::debug!(url = %req.url, %net_err, "offline cache miss");
                    Err(ApiError::Offline(req.url.clone()))
                }
                Err(err) => {
                    tracing::warn!(url = %req.url, %err, "cache read failed");
                    Err(ApiError::Offline(req.url.clone()))
                }
            },
        }
    }
}

fn store(conn: &Connection, cache: &str, url: &str, resp: &CachedResponse) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO cache_entries(cache_name, url, status, content_type, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(cache_name, url) DO UPDATE SET
            status=excluded.status, content_type=excluded.content_type,
            body=excluded.body, stored_at=excluded.stored_at",
        params![
            cache,
            url,
            resp.status,
            resp.content_type,
            resp.body,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

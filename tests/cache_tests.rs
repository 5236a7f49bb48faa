// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use khata::cache::{CachedResponse, Fetch, OfflineCache, Request, Source, WorkerState};
use khata::db::init_schema;
use khata::error::ApiError;
use khata::utils::get_setting;
use reqwest::Method;
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn ok(body: &str) -> CachedResponse {
    CachedResponse {
        status: 200,
        content_type: Some("application/json".into()),
        body: body.as_bytes().to_vec(),
    }
}

/// Canned network: URLs not in the map fail as if offline.
#[derive(Default)]
struct FakeNet {
    responses: HashMap<String, CachedResponse>,
    calls: RefCell<Vec<(Method, String)>>,
}

impl FakeNet {
    fn with(mut self, url: &str, resp: CachedResponse) -> Self {
        self.responses.insert(url.to_string(), resp);
        self
    }
}

impl Fetch for FakeNet {
    fn fetch(&self, req: &Request) -> Result<CachedResponse, ApiError> {
        self.calls.borrow_mut().push((req.method.clone(), req.url.clone()));
        self.responses
            .get(&req.url)
            .cloned()
            .ok_or_else(|| ApiError::Network("connection refused".into()))
    }
}

const URL: &str = "http://api.test/api/buyers/list";

#[test]
fn activation_deletes_only_other_generations() {
    let conn = conn();
    OfflineCache::new(&conn, "khata-v1").unwrap().put(URL, &ok("[]")).unwrap();
    let mut current = OfflineCache::new(&conn, "khata-v2").unwrap();
    current.put(URL, &ok("[1]")).unwrap();

    let purged = current.activate().unwrap();
    assert_eq!(purged, vec!["khata-v1".to_string()]);
    assert_eq!(current.keys().unwrap(), vec!["khata-v2".to_string()]);
    assert_eq!(current.lookup(URL).unwrap().unwrap().body, b"[1]".to_vec());
    assert_eq!(current.state(), WorkerState::Active);
    assert_eq!(
        get_setting(&conn, "active_cache").unwrap().as_deref(),
        Some("khata-v2")
    );

    let again = OfflineCache::new(&conn, "khata-v2").unwrap();
    assert_eq!(again.state(), WorkerState::Active);
}

#[test]
fn successful_fetch_is_returned_and_stored() {
    let conn = conn();
    let cache = OfflineCache::new(&conn, "khata-v2").unwrap();
    let net = FakeNet::default().with(URL, ok(r#"[{"id":1}]"#));

    let got = cache.handle_fetch(&Request::get(URL), &net).unwrap();
    assert_eq!(got.source, Source::Network);
    assert_eq!(got.response.body, br#"[{"id":1}]"#.to_vec());
    assert_eq!(cache.lookup(URL).unwrap().unwrap(), got.response);
}

#[test]
fn failed_fetch_serves_the_stored_copy_unchanged() {
    let conn = conn();
    let cache = OfflineCache::new(&conn, "khata-v2").unwrap();
    let stored = ok(r#"{"cached":true}"#);
    cache.put(URL, &stored).unwrap();

    let got = cache.handle_fetch(&Request::get(URL), &FakeNet::default()).unwrap();
    assert_eq!(got.source, Source::Cache);
    assert_eq!(got.response, stored);
}

#[test]
fn failed_fetch_without_copy_is_offline_error() {
    let conn = conn();
    let cache = OfflineCache::new(&conn, "khata-v2").unwrap();
    let err = cache
        .handle_fetch(&Request::get(URL), &FakeNet::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Offline(u) if u == URL));
}

#[test]
fn error_statuses_are_passed_through_but_not_cached() {
    let conn = conn();
    let cache = OfflineCache::new(&conn, "khata-v2").unwrap();
    cache.put(URL, &ok("old")).unwrap();
    let net = FakeNet::default().with(
        URL,
        CachedResponse {
            status: 500,
            content_type: None,
            body: b"boom".to_vec(),
        },
    );

    let got = cache.handle_fetch(&Request::get(URL), &net).unwrap();
    assert_eq!(got.response.status, 500);
    assert_eq!(cache.lookup(URL).unwrap().unwrap().body, b"old".to_vec());
}

#[test]
fn non_get_requests_bypass_the_cache() {
    let conn = conn();
    let cache = OfflineCache::new(&conn, "khata-v2").unwrap();
    cache.put(URL, &ok("cached")).unwrap();
    let req = Request {
        method: Method::POST,
        url: URL.to_string(),
    };

    let err = cache.handle_fetch(&req, &FakeNet::default()).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));

    let net = FakeNet::default().with(URL, ok("created"));
    let got = cache.handle_fetch(&req, &net).unwrap();
    assert_eq!(got.source, Source::Network);
    assert_eq!(cache.lookup(URL).unwrap().unwrap().body, b"cached".to_vec());
}

#[test]
fn install_is_all_or_nothing() {
    let conn = conn();
    let a = "http://api.test/api/auth/me".to_string();
    let b = "http://api.test/api/product-types".to_string();
    let mut cache = OfflineCache::new(&conn, "khata-v3").unwrap();

    let partial = FakeNet::default().with(&a, ok("{}"));
    assert!(cache.install(&partial, &[a.clone(), b.clone()]).is_err());
    assert!(cache.lookup(&a).unwrap().is_none());
    assert_ne!(cache.state(), WorkerState::Active);

    let full = FakeNet::default().with(&a, ok("{}")).with(&b, ok("[]"));
    let purged = cache.install(&full, &[a.clone(), b.clone()]).unwrap();
    assert!(purged.is_empty());
    assert_eq!(cache.state(), WorkerState::Active);
    assert!(cache.lookup(&b).unwrap().is_some());
    assert_eq!(cache.stats().unwrap(), vec![("khata-v3".to_string(), 2)]);
}

#[test]
fn clear_all_forgets_the_active_generation() {
    let conn = conn();
    let mut cache = OfflineCache::new(&conn, "khata-v2").unwrap();
    cache.activate().unwrap();
    cache.put(URL, &ok("[]")).unwrap();

    assert_eq!(cache.clear_all().unwrap(), 1);
    assert!(cache.keys().unwrap().is_empty());
    assert!(get_setting(&conn, "active_cache").unwrap().is_none());
}

#[test]
fn cache_write_failure_still_returns_the_live_response() {
    let conn = conn();
    let cache = OfflineCache::new(&conn, "khata-v1").unwrap();
    conn.execute_batch("DROP TABLE cache_entries").unwrap();
    let net = FakeNet::default().with(URL, ok("live"));

    let fetched = cache.handle_fetch(&Request::get(URL), &net).unwrap();
    assert_eq!(fetched.source, Source::Network);
    assert_eq!(fetched.response.body, b"live");
    assert_eq!(net.calls.borrow().len(), 1);
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::{CachedResponse, Fetch, OfflineCache, Request, Source, current_cache_name};
use crate::error::ApiError;
use crate::models::Token;
use crate::prefs;
use crate::utils::{get_setting, http_client};
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// `KHATA_API_URL`, then the `api_url` setting, then the local default.
pub fn base_url(conn: &Connection) -> Result<String, ApiError> {
    if let Ok(v) = std::env::var("KHATA_API_URL") {
        if !v.trim().is_empty() {
            return Ok(v.trim().trim_end_matches('/').to_string());
        }
    }
    Ok(get_setting(conn, "api_url")?
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string()))
}

/// Network side of the offline cache, backed by reqwest.
pub struct HttpFetcher<'c> {
    http: &'c Client,
    token: Option<String>,
}

impl<'c> HttpFetcher<'c> {
    pub fn new(http: &'c Client, token: Option<String>) -> Self {
        Self { http, token }
    }

    fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => rb.header(AUTHORIZATION, format!("Bearer {}", t)),
            None => rb,
        }
    }

    fn execute(&self, rb: RequestBuilder) -> Result<CachedResponse, ApiError> {
        let resp = self.authorize(rb).send()?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp.bytes()?.to_vec();
        Ok(CachedResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Fetch for HttpFetcher<'_> {
    fn fetch(&self, req: &Request) -> Result<CachedResponse, ApiError> {
        self.execute(self.http.request(req.method.clone(), &req.url))
    }
}

pub struct ApiClient<'a> {
    conn: &'a Connection,
    http: Client,
    base: String,
    cache_name: String,
}

impl<'a> ApiClient<'a> {
    pub fn new(conn: &'a Connection) -> anyhow::Result<Self> {
        Ok(Self {
            conn,
            http: http_client()?,
            base: base_url(conn)?,
            cache_name: current_cache_name(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn conn(&self) -> &Connection {
        self.conn
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn fetcher(&self) -> Result<HttpFetcher<'_>, ApiError> {
        Ok(HttpFetcher::new(&self.http, prefs::token(self.conn)?))
    }

    pub fn offline_cache(&self) -> Result<OfflineCache<'a>, ApiError> {
        OfflineCache::new(self.conn, self.cache_name.clone())
    }

    /// GET through the offline cache.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch_cached(Request::get(self.url(path)))
    }

    pub fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let built = self.http.get(self.url(path)).query(query).build()?;
        self.fetch_cached(Request::get(built.url().to_string()))
    }

    fn fetch_cached<T: DeserializeOwned>(&self, req: Request) -> Result<T, ApiError> {
        let fetched = self
            .offline_cache()?
            .handle_fetch(&req, &self.fetcher()?)?;
        if fetched.source == Source::Cache {
            eprintln!("(offline: showing cached data)");
        }
        self.decode(fetched.response)
    }

    /// Issue several GETs at once and decode each to JSON. Every result
    /// still passes through the offline cache.
    pub fn get_json_all(&self, paths: &[String]) -> Result<Vec<Value>, ApiError> {
        let fetcher = self.fetcher()?;
        let reqs: Vec<Request> = paths.iter().map(|p| Request::get(self.url(p))).collect();
        let outcomes: Vec<Result<CachedResponse, ApiError>> = std::thread::scope(|s| {
            let handles: Vec<_> = reqs
                .iter()
                .map(|r| {
                    let f = &fetcher;
                    s.spawn(move || f.fetch(r))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(ApiError::Network("request thread panicked".into()))
                    })
                })
                .collect()
        });
        let cache = self.offline_cache()?;
        reqs.iter()
            .zip(outcomes)
            .map(|(req, outcome)| {
                let fetched = cache.settle(req, outcome)?;
                self.decode(fetched.response)
            })
            .collect()
    }

    pub fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(Method::POST, path, Some(body))?;
        self.decode(resp)
    }

    pub fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(Method::PUT, path, Some(body))?;
        self.decode(resp)
    }

    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        let resp = self.send::<()>(Method::DELETE, path, None)?;
        self.check(resp).map(|_| ())
    }

    fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<CachedResponse, ApiError> {
        let mut rb = self.http.request(method, self.url(path));
        if let Some(b) = body {
            rb = rb.json(b);
        }
        self.fetcher()?.execute(rb)
    }

    /// OAuth2 password form login; stores the bearer token on success.
    pub fn login(&self, email: &str, password: &str) -> Result<Token, ApiError> {
        let rb = self
            .http
            .post(self.url("/auth/login"))
            .form(&[("username", email), ("password", password)]);
        let resp = HttpFetcher::new(&self.http, None).execute(rb)?;
        let token: Token = self.decode(resp)?;
        prefs::set_token(self.conn, &token.access_token)?;
        tracing::info!(email, "logged in");
        Ok(token)
    }

    pub fn change_password(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let rb = self
            .http
            .post(self.url("/auth/change-password"))
            .query(&[("old_password", old), ("new_password", new)]);
        let resp = self.fetcher()?.execute(rb)?;
        self.check(resp).map(|_| ())
    }

    fn check(&self, resp: CachedResponse) -> Result<CachedResponse, ApiError> {
        if resp.is_success() {
            return Ok(resp);
        }
        let err = ApiError::from_response(resp.status, &resp.body);
        if matches!(err, ApiError::Unauthorized) {
            tracing::warn!("backend rejected token; clearing it");
            prefs::clear_token(self.conn)?;
        }
        Err(err)
    }

    fn decode<T: DeserializeOwned>(&self, resp: CachedResponse) -> Result<T, ApiError> {
        let resp = self.check(resp)?;
        Ok(serde_json::from_slice(&resp.body)?)
    }
}

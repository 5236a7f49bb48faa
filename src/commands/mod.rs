// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::DateRange;
use crate::utils::{opt_arg, parse_date, parse_decimal};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

pub mod analytics;
pub mod auth;
pub mod buyers;
pub mod cache;
pub mod config;
pub mod expenses;
pub mod products;
pub mod prompts;
pub mod purchases;
pub mod reminders;
pub mod sales;

pub(crate) fn json_flags(sub: &clap::ArgMatches) -> (bool, bool) {
    let has = |id: &str| sub.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false);
    (has("json"), has("jsonl"))
}

pub(crate) fn date_range(sub: &clap::ArgMatches) -> Result<DateRange> {
    let parse = |id: &str| -> Result<Option<chrono::NaiveDate>> {
        match sub.try_get_one::<String>(id).ok().flatten() {
            Some(s) => Ok(Some(parse_date(s)?)),
            None => Ok(None),
        }
    };
    Ok(DateRange {
        start_date: parse("from")?,
        end_date: parse("to")?,
    })
}

/// `--date` when given, otherwise today.
pub(crate) fn date_or_today(sub: &clap::ArgMatches) -> Result<chrono::NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(s) => parse_date(s),
        None => Ok(crate::utils::today()),
    }
}

/// Body of an `update` subcommand: only the flags that were given.
#[derive(Debug, Default)]
pub(crate) struct Patch(Map<String, Value>);

impl Patch {
    pub(crate) fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        self.0.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub(crate) fn text(&mut self, sub: &clap::ArgMatches, id: &str, key: &str) {
        if let Some(v) = opt_arg(sub, id) {
            self.0.insert(key.to_string(), Value::String(v));
        }
    }

    pub(crate) fn decimal(
        &mut self,
        sub: &clap::ArgMatches,
        id: &str,
        key: &str,
    ) -> Result<Option<Decimal>> {
        match opt_arg(sub, id) {
            Some(raw) => {
                let d = parse_decimal(&raw)?;
                self.insert(key, &d)?;
                Ok(Some(d))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn date(&mut self, sub: &clap::ArgMatches) -> Result<()> {
        if let Some(raw) = opt_arg(sub, "date") {
            self.insert("date", &parse_date(&raw)?)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Map<String, Value>> {
        if self.0.is_empty() {
            bail!("Nothing to update");
        }
        Ok(self.0)
    }
}

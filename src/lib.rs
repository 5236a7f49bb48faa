// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod cache;
pub mod cli;
pub mod db;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod prefs;
pub mod reminder;
pub mod statement;
pub mod utils;
pub mod worker;
pub mod commands;

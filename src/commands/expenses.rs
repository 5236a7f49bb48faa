// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Patch, date_or_today, date_range, json_flags};
use crate::api::ApiClient;
use crate::export::{default_csv_path, write_csv_file};
use crate::ledger::format_inr;
use crate::models::{CategoryTotal, DateRange, Expense, ExpenseCreate};
use crate::utils::{fmt_date, maybe_print_json, opt_arg, parse_decimal, pretty_table, today};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(api, sub)?,
        Some(("add", sub)) => {
            let body = expense_from_args(sub)?;
            let e: Expense = api.post("/expenses", &body)?;
            println!(
                "Recorded {} expense of {} on {}",
                e.category,
                format_inr(e.amount),
                fmt_date(e.date)
            );
        }
        Some(("show", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let id = *sub.get_one::<i64>("id").unwrap();
            let e: Expense = api.get(&format!("/expenses/{}", id))?;
            if !maybe_print_json(json_flag, jsonl_flag, &e)? {
                let rows = vec![
                    vec!["Date".to_string(), fmt_date(e.date)],
                    vec!["Category".to_string(), e.category.clone()],
                    vec!["Amount".to_string(), format_inr(e.amount)],
                    vec![
                        "Description".to_string(),
                        e.description.clone().unwrap_or_default(),
                    ],
                ];
                println!("Expense #{}", e.id);
                println!("{}", pretty_table(&["Field", "Value"], rows));
            }
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let body = expense_fields(sub)?;
            let e: Expense = api.put(&format!("/expenses/{}", id), &body)?;
            println!(
                "Updated expense #{}: {} {} on {}",
                e.id,
                e.category,
                format_inr(e.amount),
                fmt_date(e.date)
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            api.delete(&format!("/expenses/{}", id))?;
            println!("Removed expense {}", id);
        }
        Some(("export", sub)) => {
            let q = ExpenseQuery {
                range: date_range(sub)?,
                category: None,
            };
            let items: Vec<Expense> = api.get_with("/expenses", &q)?;
            let path = default_csv_path(
                "expenses",
                today(),
                sub.get_one::<String>("out").map(|s| s.as_str()),
            );
            let n = write_csv_file(&export_rows(&items), &path)?;
            println!("Exported {} expenses to {}", n, path.display());
        }
        Some(("by-category", sub)) => by_category(api, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct ExpenseQuery {
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn list(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let q = ExpenseQuery {
        range: date_range(sub)?,
        category: opt_arg(sub, "category"),
    };
    let items: Vec<Expense> = api.get_with("/expenses", &q)?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let total: Decimal = items.iter().map(|e| e.amount).sum();
        let rows = items
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    fmt_date(e.date),
                    e.category.clone(),
                    format_inr(e.amount),
                    e.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Category", "Amount", "Description"], rows)
        );
        println!("Total: {}", format_inr(total));
    }
    Ok(())
}

pub fn expense_from_args(sub: &clap::ArgMatches) -> Result<ExpenseCreate> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Please enter a valid amount");
    }
    Ok(ExpenseCreate {
        date: date_or_today(sub)?,
        category: sub.get_one::<String>("category").unwrap().clone(),
        amount,
        description: opt_arg(sub, "description"),
    })
}

/// Partial body for `expenses update`.
pub fn expense_fields(sub: &clap::ArgMatches) -> Result<Map<String, Value>> {
    let mut p = Patch::default();
    p.date(sub)?;
    p.text(sub, "category", "category");
    if let Some(amount) = p.decimal(sub, "amount", "amount")? {
        if amount <= Decimal::ZERO {
            bail!("Please enter a valid amount");
        }
    }
    p.text(sub, "description", "description");
    p.finish()
}

fn by_category(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let range = date_range(sub)?;
    let mut items: Vec<CategoryTotal> = api.get_with("/expenses/stats/by-category", &range)?;
    items.sort_by(|a, b| b.total.cmp(&a.total));
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows = items
            .iter()
            .map(|c| vec![c.category.clone(), format_inr(c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Total"], rows));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ExpenseExportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "Description")]
    pub description: String,
}

pub fn export_rows(items: &[Expense]) -> Vec<ExpenseExportRow> {
    items
        .iter()
        .map(|e| ExpenseExportRow {
            date: fmt_date(e.date),
            category: e.category.clone(),
            amount: e.amount,
            description: e.description.clone().unwrap_or_default(),
        })
        .collect()
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Patch, date_or_today, date_range, json_flags};
use crate::api::ApiClient;
use crate::export::{default_csv_path, write_csv_file};
use crate::ledger::format_inr;
use crate::models::{DateRange, PaymentType, Sale, SaleCreate, SaleItemCreate};
use crate::utils::{fmt_date, maybe_print_json, opt_arg, parse_decimal, pretty_table, today};
use anyhow::{Context, Result, anyhow, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(api, sub)?,
        Some(("show", sub)) => show(api, sub)?,
        Some(("add", sub)) => {
            let body = sale_from_args(sub)?;
            println!("Grand total: {}", format_inr(grand_total(&body.sale_items)));
            let s: Sale = api.post("/sales", &body)?;
            println!(
                "Sale #{} to {}: {} ({})",
                s.id,
                s.buyer.name,
                format_inr(s.total_amount),
                s.payment_type.as_str()
            );
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let body = sale_fields(sub)?;
            let s: Sale = api.put(&format!("/sales/{}", id), &body)?;
            println!(
                "Updated sale #{} to {}: {} ({})",
                s.id,
                s.buyer.name,
                format_inr(s.total_amount),
                s.payment_type.as_str()
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            api.delete(&format!("/sales/{}", id))?;
            println!("Removed sale {}", id);
        }
        Some(("export", sub)) => {
            let q = SaleQuery {
                range: date_range(sub)?,
                ..Default::default()
            };
            let items: Vec<Sale> = api.get_with("/sales", &q)?;
            let path = default_csv_path(
                "sales",
                today(),
                sub.get_one::<String>("out").map(|s| s.as_str()),
            );
            let n = write_csv_file(&export_rows(&items), &path)?;
            println!("Exported {} sales to {}", n, path.display());
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct SaleQuery {
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn list(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let payment_type = opt_arg(sub, "payment_type")
        .map(|raw| payment_type(&raw))
        .transpose()?;
    let q = SaleQuery {
        range: date_range(sub)?,
        buyer_id: sub.get_one::<i64>("buyer").copied(),
        payment_type,
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let items: Vec<Sale> = api.get_with("/sales", &q)?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows = items
            .iter()
            .map(|s| {
                vec![
                    s.id.to_string(),
                    fmt_date(s.date),
                    s.buyer.name.clone(),
                    s.payment_type.as_str().to_string(),
                    format_inr(s.total_amount),
                    format_inr(s.payment_received_now),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Buyer", "Payment", "Total", "Received"],
                rows,
            )
        );
    }
    Ok(())
}

fn show(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let s: Sale = api.get(&format!("/sales/{}", id))?;
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    println!(
        "Sale #{} on {} to {} ({})",
        s.id,
        fmt_date(s.date),
        s.buyer.name,
        s.payment_type.as_str()
    );
    let rows = s
        .sale_items
        .iter()
        .map(|i| {
            vec![
                i.product_type
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("#{}", i.product_type_id)),
                format!("{} {}", i.quantity.normalize(), i.unit),
                format_inr(i.price_per_unit),
                format_inr(i.total_price),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Product", "Qty", "Rate", "Total"], rows)
    );
    println!(
        "Total: {}  Received: {}",
        format_inr(s.total_amount),
        format_inr(s.payment_received_now)
    );
    if let Some(n) = &s.notes {
        println!("Notes: {}", n);
    }
    Ok(())
}

/// `PRODUCT_ID:QTY:PRICE[:UNIT]`, unit defaulting to `kg`.
pub fn parse_item(raw: &str) -> Result<SaleItemCreate> {
    let parts: Vec<&str> = raw.split(':').map(|p| p.trim()).collect();
    if !(3..=4).contains(&parts.len()) {
        bail!("Invalid item '{}', expected PRODUCT_ID:QTY:PRICE[:UNIT]", raw);
    }
    Ok(SaleItemCreate {
        product_type_id: parts[0]
            .parse()
            .with_context(|| format!("Invalid product id in '{}'", raw))?,
        quantity: parse_decimal(parts[1])?,
        unit: parts
            .get(3)
            .filter(|u| !u.is_empty())
            .map(|u| u.to_string())
            .unwrap_or_else(|| "kg".into()),
        price_per_unit: parse_decimal(parts[2])?,
    })
}

/// Keeps only items with a product, a positive quantity and a positive price.
pub fn valid_items(items: Vec<SaleItemCreate>) -> Result<Vec<SaleItemCreate>> {
    let total = items.len();
    let kept: Vec<SaleItemCreate> = items
        .into_iter()
        .filter(|i| {
            i.product_type_id > 0 && i.quantity > Decimal::ZERO && i.price_per_unit > Decimal::ZERO
        })
        .collect();
    if kept.is_empty() {
        bail!("Please add at least one valid product");
    }
    if kept.len() < total {
        tracing::warn!(dropped = total - kept.len(), "ignoring invalid sale items");
    }
    Ok(kept)
}

fn payment_type(raw: &str) -> Result<PaymentType> {
    PaymentType::parse(raw)
        .ok_or_else(|| anyhow!("Unknown payment type '{}' (Paid|Partial|Credit)", raw))
}

fn items_from_args(sub: &clap::ArgMatches) -> Result<Vec<SaleItemCreate>> {
    let items = sub
        .get_many::<String>("item")
        .unwrap_or_default()
        .map(|s| parse_item(s))
        .collect::<Result<Vec<_>>>()?;
    valid_items(items)
}

pub fn grand_total(items: &[SaleItemCreate]) -> Decimal {
    items.iter().map(|i| i.quantity * i.price_per_unit).sum()
}

pub fn sale_from_args(sub: &clap::ArgMatches) -> Result<SaleCreate> {
    let payment_type = payment_type(sub.get_one::<String>("payment_type").unwrap())?;
    let items = items_from_args(sub)?;
    Ok(SaleCreate {
        date: date_or_today(sub)?,
        buyer_id: *sub.get_one::<i64>("buyer").unwrap(),
        payment_type,
        payment_received_now: parse_decimal(sub.get_one::<String>("received").unwrap())?,
        notes: opt_arg(sub, "notes"),
        sale_items: items,
    })
}

/// Partial body for `sales update`. Items, when given, replace the sale's
/// whole item list.
pub fn sale_fields(sub: &clap::ArgMatches) -> Result<Map<String, Value>> {
    let mut p = Patch::default();
    p.date(sub)?;
    if let Some(buyer) = sub.get_one::<i64>("buyer") {
        p.insert("buyer_id", buyer)?;
    }
    if let Some(raw) = opt_arg(sub, "payment_type") {
        p.insert("payment_type", &payment_type(&raw)?)?;
    }
    p.decimal(sub, "received", "payment_received_now")?;
    p.text(sub, "notes", "notes");
    if sub.contains_id("item") {
        p.insert("sale_items", &items_from_args(sub)?)?;
    }
    p.finish()
}

#[derive(Debug, Serialize)]
pub struct SaleExportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Buyer")]
    pub buyer: String,
    #[serde(rename = "Payment Type")]
    pub payment_type: String,
    #[serde(rename = "Total Amount")]
    pub total_amount: Decimal,
    #[serde(rename = "Payment Received")]
    pub payment_received: Decimal,
    #[serde(rename = "Balance")]
    pub balance: Decimal,
    #[serde(rename = "Notes")]
    pub notes: String,
}

pub fn export_rows(items: &[Sale]) -> Vec<SaleExportRow> {
    items
        .iter()
        .map(|s| SaleExportRow {
            date: fmt_date(s.date),
            buyer: s.buyer.name.clone(),
            payment_type: s.payment_type.as_str().to_string(),
            total_amount: s.total_amount,
            payment_received: s.payment_received_now,
            balance: s.total_amount - s.payment_received_now,
            notes: s.notes.clone().unwrap_or_default(),
        })
        .collect()
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Patch, date_or_today, date_range, json_flags};
use crate::api::ApiClient;
use crate::export::{default_csv_path, write_csv_file};
use crate::ledger::format_inr;
use crate::models::{DateRange, Purchase, PurchaseCreate};
use crate::utils::{fmt_date, maybe_print_json, opt_arg, parse_decimal, pretty_table, today};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(api, sub)?,
        Some(("add", sub)) => {
            let body = purchase_from_args(sub)?;
            let p: Purchase = api.post("/purchases", &body)?;
            println!(
                "Recorded purchase #{} from {}: {}",
                p.id,
                p.seller_name,
                format_inr(p.total_purchase_cost)
            );
        }
        Some(("show", sub)) => show(api, sub)?,
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let body = purchase_fields(sub)?;
            let p: Purchase = api.put(&format!("/purchases/{}", id), &body)?;
            println!(
                "Updated purchase #{} from {}: {}",
                p.id,
                p.seller_name,
                format_inr(p.total_purchase_cost)
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            api.delete(&format!("/purchases/{}", id))?;
            println!("Removed purchase {}", id);
        }
        Some(("export", sub)) => {
            let items = fetch(api, &PurchaseQuery::from_range(date_range(sub)?))?;
            let path = default_csv_path(
                "purchases",
                today(),
                sub.get_one::<String>("out").map(|s| s.as_str()),
            );
            let n = write_csv_file(&export_rows(&items), &path)?;
            println!("Exported {} purchases to {}", n, path.display());
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct PurchaseQuery {
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrap_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl PurchaseQuery {
    fn from_range(range: DateRange) -> Self {
        Self {
            range,
            ..Default::default()
        }
    }
}

fn fetch(api: &ApiClient, q: &PurchaseQuery) -> Result<Vec<Purchase>> {
    Ok(api.get_with("/purchases", q)?)
}

fn list(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let q = PurchaseQuery {
        range: date_range(sub)?,
        seller_name: opt_arg(sub, "seller"),
        scrap_type: opt_arg(sub, "scrap_type"),
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let items = fetch(api, &q)?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows = items
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    fmt_date(p.date),
                    p.seller_name.clone(),
                    p.scrap_type.clone(),
                    format!("{} {}", p.quantity.normalize(), p.unit),
                    format_inr(p.price_per_unit),
                    format_inr(p.transport_cost),
                    format_inr(p.actual_paid_amount.unwrap_or(p.total_purchase_cost)),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Seller", "Scrap", "Qty", "Rate", "Transport", "Paid"],
                rows,
            )
        );
    }
    Ok(())
}

fn show(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let p: Purchase = api.get(&format!("/purchases/{}", id))?;
    if maybe_print_json(json_flag, jsonl_flag, &p)? {
        return Ok(());
    }
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let rows = vec![
        vec!["Date".to_string(), fmt_date(p.date)],
        vec!["Seller".to_string(), p.seller_name.clone()],
        vec!["Seller phone".to_string(), text(&p.seller_phone)],
        vec!["Pickup".to_string(), text(&p.pickup_location)],
        vec!["Scrap type".to_string(), p.scrap_type.clone()],
        vec!["Quantity".to_string(), format!("{} {}", p.quantity.normalize(), p.unit)],
        vec!["Rate".to_string(), format_inr(p.price_per_unit)],
        vec!["Transport".to_string(), text(&p.transport_service)],
        vec!["Transport cost".to_string(), format_inr(p.transport_cost)],
        vec!["Total cost".to_string(), format_inr(p.total_purchase_cost)],
        vec![
            "Paid".to_string(),
            p.actual_paid_amount.map(format_inr).unwrap_or_default(),
        ],
        vec!["Notes".to_string(), text(&p.notes)],
    ];
    println!("Purchase #{}", p.id);
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

pub fn purchase_from_args(sub: &clap::ArgMatches) -> Result<PurchaseCreate> {
    let dec = |id: &str| -> Result<Decimal> { parse_decimal(sub.get_one::<String>(id).unwrap()) };
    Ok(PurchaseCreate {
        date: date_or_today(sub)?,
        seller_name: sub.get_one::<String>("seller").unwrap().trim().to_string(),
        seller_phone: opt_arg(sub, "seller_phone"),
        pickup_location: opt_arg(sub, "pickup"),
        scrap_type: sub.get_one::<String>("scrap_type").unwrap().trim().to_string(),
        transport_service: opt_arg(sub, "transport"),
        transport_cost: dec("transport_cost")?,
        quantity: dec("quantity")?,
        unit: sub.get_one::<String>("unit").unwrap().trim().to_string(),
        price_per_unit: dec("price")?,
        actual_paid_amount: opt_arg(sub, "paid")
            .map(|s| parse_decimal(&s))
            .transpose()?,
        notes: opt_arg(sub, "notes"),
    })
}

/// Partial body for `purchases update`.
pub fn purchase_fields(sub: &clap::ArgMatches) -> Result<Map<String, Value>> {
    let mut p = Patch::default();
    p.date(sub)?;
    p.text(sub, "seller", "seller_name");
    p.text(sub, "seller_phone", "seller_phone");
    p.text(sub, "pickup", "pickup_location");
    p.text(sub, "scrap_type", "scrap_type");
    p.text(sub, "transport", "transport_service");
    p.decimal(sub, "transport_cost", "transport_cost")?;
    p.decimal(sub, "quantity", "quantity")?;
    p.text(sub, "unit", "unit");
    p.decimal(sub, "price", "price_per_unit")?;
    p.decimal(sub, "paid", "actual_paid_amount")?;
    p.text(sub, "notes", "notes");
    p.finish()
}

#[derive(Debug, Serialize)]
pub struct PurchaseExportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Seller Name")]
    pub seller_name: String,
    #[serde(rename = "Seller Phone")]
    pub seller_phone: String,
    #[serde(rename = "Scrap Type")]
    pub scrap_type: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Price per Unit")]
    pub price_per_unit: Decimal,
    #[serde(rename = "Transport Cost")]
    pub transport_cost: Decimal,
    #[serde(rename = "Total Cost")]
    pub total_cost: Decimal,
    #[serde(rename = "Notes")]
    pub notes: String,
}

pub fn export_rows(items: &[Purchase]) -> Vec<PurchaseExportRow> {
    items
        .iter()
        .map(|p| PurchaseExportRow {
            date: fmt_date(p.date),
            seller_name: p.seller_name.clone(),
            seller_phone: p.seller_phone.clone().unwrap_or_default(),
            scrap_type: p.scrap_type.clone(),
            quantity: format!("{} {}", p.quantity.normalize(), p.unit),
            price_per_unit: p.price_per_unit,
            transport_cost: p.transport_cost,
            total_cost: p.total_purchase_cost,
            notes: p.notes.clone().unwrap_or_default(),
        })
        .collect()
}

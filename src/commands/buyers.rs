// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Patch, date_or_today, date_range, json_flags};
use crate::api::ApiClient;
use crate::ledger::{format_inr, ledger_rows, resolve_balances, signed_amount, summary};
use crate::models::{Buyer, BuyerCreate, BuyerLedger, BuyerListItem, Payment, PaymentCreate};
use crate::statement::{statement_text, whatsapp_link};
use crate::utils::{fmt_date, maybe_print_json, opt_arg, parse_decimal, pretty_table, today};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(api, sub)?,
        Some(("show", sub)) => show(api, sub)?,
        Some(("add", sub)) => {
            let body = buyer_from_args(sub)?;
            let b: Buyer = api.post("/buyers", &body)?;
            println!("Customer created: {} (id {})", b.name, b.id);
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let body = buyer_fields(sub)?;
            let b: Buyer = api.put(&format!("/buyers/{}", id), &body)?;
            println!("Customer updated: {} (id {})", b.name, b.id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            api.delete(&format!("/buyers/{}", id))?;
            println!("Removed customer {}", id);
        }
        Some(("ledger", sub)) => ledger(api, sub)?,
        Some(("pay", sub)) => pay(api, sub)?,
        Some(("payments", sub)) => payments(api, sub)?,
        Some(("statement", sub)) => statement(api, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn buyer_from_args(sub: &clap::ArgMatches) -> Result<BuyerCreate> {
    let Some(name) = opt_arg(sub, "name") else {
        bail!("Customer name is required");
    };
    Ok(BuyerCreate {
        name,
        phone: opt_arg(sub, "phone"),
        address: opt_arg(sub, "address"),
        notes: opt_arg(sub, "notes"),
        opening_balance: opt_arg(sub, "opening_balance")
            .map(|raw| parse_decimal(&raw))
            .transpose()?,
    })
}

/// Partial body for `buyers update`.
pub fn buyer_fields(sub: &clap::ArgMatches) -> Result<Map<String, Value>> {
    let mut p = Patch::default();
    for key in ["name", "phone", "address", "notes"] {
        p.text(sub, key, key);
    }
    p.decimal(sub, "opening_balance", "opening_balance")?;
    p.finish()
}

fn list(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let items: Vec<BuyerListItem> = match opt_arg(sub, "search") {
        Some(q) => api
            .get_with::<Vec<Buyer>, _>("/buyers", &[("search", q)])?
            .into_iter()
            .map(|b| BuyerListItem {
                id: b.id,
                name: b.name,
                phone: b.phone,
                outstanding_balance: b.outstanding_balance,
            })
            .collect(),
        None => api.get("/buyers/list")?,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows = items
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.name.clone(),
                    b.phone.clone().unwrap_or_default(),
                    signed_amount(b.outstanding_balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Phone", "Outstanding"], rows)
        );
    }
    Ok(())
}

fn show(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let b: Buyer = api.get(&format!("/buyers/{}", id))?;
    if !maybe_print_json(json_flag, jsonl_flag, &b)? {
        let rows = vec![
            vec!["Name".to_string(), b.name.clone()],
            vec!["Phone".to_string(), b.phone.clone().unwrap_or_default()],
            vec!["Address".to_string(), b.address.clone().unwrap_or_default()],
            vec!["Notes".to_string(), b.notes.clone().unwrap_or_default()],
            vec!["Opening balance".to_string(), signed_amount(b.opening_balance)],
            vec!["Total sales".to_string(), format_inr(b.total_sales)],
            vec!["Total payments".to_string(), format_inr(b.total_payments)],
            vec!["Outstanding".to_string(), signed_amount(b.outstanding_balance)],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

pub fn fetch_ledger(api: &ApiClient, id: i64, sub: &clap::ArgMatches) -> Result<BuyerLedger> {
    let range = date_range(sub)?;
    let mut ledger: BuyerLedger = api.get_with(&format!("/buyers/{}/ledger", id), &range)?;
    resolve_balances(ledger.opening_balance, &mut ledger.entries);
    Ok(ledger)
}

fn ledger(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let ledger = fetch_ledger(api, id, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &ledger)? {
        return Ok(());
    }

    let s = summary(&ledger);
    println!("Customer Khata: {}", ledger.buyer.name);
    if let Some(p) = &ledger.buyer.phone {
        println!("Phone: {}", p);
    }
    println!(
        "{}",
        pretty_table(
            &["Amount Receivable", "Total Sales", "Total Payments", "Advance Received"],
            vec![vec![
                signed_amount(s.receivable),
                format_inr(s.total_sales),
                format_inr(s.total_payments),
                format_inr(s.advance_received),
            ]],
        )
    );
    println!("Opening balance: {}", signed_amount(ledger.opening_balance));
    if ledger.entries.is_empty() {
        println!("No transactions yet");
    } else {
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Description", "Debit", "Credit", "Balance"],
                ledger_rows(&ledger.entries),
            )
        );
    }
    Ok(())
}

pub fn payment_from_args(buyer_id: i64, sub: &clap::ArgMatches) -> Result<PaymentCreate> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Please enter a valid amount");
    }
    Ok(PaymentCreate {
        date: date_or_today(sub)?,
        buyer_id,
        amount,
        payment_method: sub
            .get_one::<String>("method")
            .cloned()
            .unwrap_or_else(|| "Cash".into()),
        notes: opt_arg(sub, "notes"),
    })
}

fn pay(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let body = payment_from_args(id, sub)?;
    let p: Payment = api.post(&format!("/buyers/{}/payments", id), &body)?;
    println!(
        "Payment recorded: {} on {} ({})",
        format_inr(p.amount),
        fmt_date(p.date),
        p.payment_method
    );
    Ok(())
}

fn payments(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let items: Vec<Payment> = api.get(&format!("/buyers/{}/payments", id))?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows = items
            .iter()
            .map(|p| {
                vec![
                    fmt_date(p.date),
                    format_inr(p.amount),
                    p.payment_method.clone(),
                    p.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Amount", "Method", "Notes"], rows)
        );
    }
    Ok(())
}

fn statement(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let ledger = fetch_ledger(api, id, sub)?;
    if sub.get_flag("text") {
        println!("{}", statement_text(&ledger, today()));
    } else {
        println!("{}", whatsapp_link(&ledger, today())?);
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Presentation of a buyer's khata.
//!
//! Balances follow one sign convention everywhere: a positive balance is a
//! receivable (the customer owes the business), a negative balance is an
//! advance held for the customer. Negative values are shown as `- ₹amount`.

use crate::models::{BuyerLedger, EntryKind, LedgerEntry};
use crate::utils::fmt_date;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Rupee amount with Indian digit grouping, e.g. `₹12,34,567.50`.
pub fn format_inr(d: Decimal) -> String {
    let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}₹{}.{}", sign, group_indian(int_part), frac)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, g) = rest.split_at(rest.len() - 2);
        groups.push(g);
        rest = h;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{}", groups.join(","), last3)
}

/// Signed display: `- ₹500.00` for negatives, plain amount otherwise.
pub fn signed_amount(d: Decimal) -> String {
    if d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero) < Decimal::ZERO {
        format!("- {}", format_inr(d.abs()))
    } else {
        format_inr(d)
    }
}

/// Debit/credit column cell: the amount when positive, `-` otherwise.
pub fn amount_cell(d: Decimal) -> String {
    if d > Decimal::ZERO {
        format_inr(d)
    } else {
        "-".to_string()
    }
}

/// Fill in missing running balances by folding `debit - credit` over the
/// opening balance in entry order. Balances supplied by the backend are kept
/// as-is and become the base for the entries that follow them.
pub fn resolve_balances(opening: Decimal, entries: &mut [LedgerEntry]) -> usize {
    let mut running = opening;
    let mut filled = 0;
    for e in entries.iter_mut() {
        match e.balance {
            Some(b) => running = b,
            None => {
                running = running + e.debit - e.credit;
                e.balance = Some(running);
                filled += 1;
            }
        }
    }
    if filled > 0 {
        tracing::debug!(filled, "ledger balances derived client-side");
    }
    filled
}

/// Backend closing balance when present, else the last entry balance, else
/// the opening balance.
pub fn closing_balance(ledger: &BuyerLedger) -> Decimal {
    ledger
        .closing_balance
        .or_else(|| ledger.entries.last().and_then(|e| e.balance))
        .unwrap_or(ledger.opening_balance)
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub total_sales: Decimal,
    pub total_payments: Decimal,
    pub advance_received: Decimal,
    pub receivable: Decimal,
}

pub fn summary(ledger: &BuyerLedger) -> LedgerSummary {
    let opening = ledger.buyer.opening_balance;
    LedgerSummary {
        total_sales: ledger.buyer.total_sales,
        total_payments: ledger.buyer.total_payments,
        advance_received: if opening < Decimal::ZERO {
            opening.abs()
        } else {
            Decimal::ZERO
        },
        receivable: closing_balance(ledger),
    }
}

pub fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Sale => "SALE",
        EntryKind::Payment => "PAYMENT",
    }
}

/// Table rows: Date, Type, Description, Debit, Credit, Balance.
pub fn ledger_rows(entries: &[LedgerEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                fmt_date(e.date),
                kind_label(e.kind).to_string(),
                e.description.clone(),
                amount_cell(e.debit),
                amount_cell(e.credit),
                e.balance.map(signed_amount).unwrap_or_else(|| "-".into()),
            ]
        })
        .collect()
}

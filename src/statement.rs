// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{closing_balance, signed_amount};
use crate::models::{BuyerLedger, EntryKind};
use crate::utils::fmt_date;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

pub const STATEMENT_LIMIT: usize = 15;
pub const BUSINESS_NAME: &str = "Kastbhanjan Plywood";
const SEPARATOR: &str = "------------------------";

static SALE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"Sale #\d+ - ").unwrap());

/// Digits only; a bare 10-digit number gets the `91` country code.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("91{}", digits)
    } else {
        digits
    }
}

pub fn statement_text(ledger: &BuyerLedger, today: NaiveDate) -> String {
    let mut msg = String::new();
    msg.push_str(&format!("*{} - Statement*\n", BUSINESS_NAME));
    msg.push_str(&format!("Customer: {}\n", ledger.buyer.name));
    msg.push_str(&format!("Date: {}\n", fmt_date(today)));
    msg.push_str(SEPARATOR);
    msg.push('\n');
    msg.push_str("*Recent Transactions:*\n");

    for e in ledger.entries.iter().take(STATEMENT_LIMIT) {
        let (tag, amount) = match e.kind {
            EntryKind::Sale => ("DR", e.debit),
            EntryKind::Payment => ("CR", e.credit),
        };
        let desc = SALE_PREFIX.replace(&e.description, "");
        msg.push_str(&format!(
            "{} - {} ({}) - ₹{}\n",
            fmt_date(e.date),
            desc,
            tag,
            amount.normalize()
        ));
    }
    if ledger.entries.len() > STATEMENT_LIMIT {
        msg.push_str(&format!(
            "... (+{} more)\n",
            ledger.entries.len() - STATEMENT_LIMIT
        ));
    }

    msg.push_str(SEPARATOR);
    msg.push('\n');
    msg.push_str(&format!(
        "*Outstanding Balance: {}*\n\n",
        signed_amount(closing_balance(ledger))
    ));
    msg.push_str("Please pay the outstanding amount at the earliest.\nThank you!");
    msg
}

/// `wa.me` share link carrying the statement for the buyer's phone.
pub fn whatsapp_link(ledger: &BuyerLedger, today: NaiveDate) -> Result<Url> {
    let phone = normalize_phone(ledger.buyer.phone.as_deref().unwrap_or(""));
    if phone.is_empty() {
        bail!("Customer phone number not available");
    }
    let text = statement_text(ledger, today);
    let url = Url::parse_with_params(&format!("https://wa.me/{}", phone), &[("text", text)])?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization() {
        assert_eq!(normalize_phone("+91 98765 43210"), "919876543210");
        assert_eq!(normalize_phone("9876543210"), "919876543210");
        assert_eq!(normalize_phone("98765-43210"), "919876543210");
        assert_eq!(normalize_phone("12345"), "12345");
        assert_eq!(normalize_phone("n/a"), "");
    }

    #[test]
    fn sale_prefix_is_stripped_once() {
        assert_eq!(SALE_PREFIX.replace("Sale #42 - 18mm ply", ""), "18mm ply");
        assert_eq!(SALE_PREFIX.replace("Payment - UPI", ""), "Payment - UPI");
    }
}

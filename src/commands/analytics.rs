// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{date_range, json_flags};
use crate::api::ApiClient;
use crate::ledger::{format_inr, signed_amount};
use crate::models::{DashboardSummary, MonthlyStats, ProductSalesStats, TopBuyerStats};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("dashboard", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let d: DashboardSummary = api.get("/analytics/dashboard-summary")?;
            if !maybe_print_json(json_flag, jsonl_flag, &d)? {
                println!("{}", dashboard_table(&d));
            }
        }
        Some(("overview", sub)) => overview(api, sub)?,
        Some(("monthly", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let months = *sub.get_one::<u32>("months").unwrap();
            let items: Vec<MonthlyStats> =
                api.get_with("/analytics/monthly-stats", &[("months", months)])?;
            if !maybe_print_json(json_flag, jsonl_flag, &items)? {
                println!("{}", monthly_table(&items));
            }
        }
        Some(("products", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let range = date_range(sub)?;
            let items: Vec<ProductSalesStats> =
                api.get_with("/analytics/product-sales", &range)?;
            if !maybe_print_json(json_flag, jsonl_flag, &items)? {
                println!("{}", products_table(&items));
            }
        }
        Some(("top-buyers", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let limit = *sub.get_one::<u32>("limit").unwrap();
            let items: Vec<TopBuyerStats> =
                api.get_with("/analytics/top-buyers", &[("limit", limit)])?;
            if !maybe_print_json(json_flag, jsonl_flag, &items)? {
                println!("{}", top_buyers_table(&items));
            }
        }
        _ => {}
    }
    Ok(())
}

/// The three report requests go out together; nothing renders until all
/// three have answered.
fn overview(api: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let months = *sub.get_one::<u32>("months").unwrap();
    let limit = *sub.get_one::<u32>("limit").unwrap();
    let paths = vec![
        format!("/analytics/monthly-stats?months={}", months),
        "/analytics/product-sales".to_string(),
        format!("/analytics/top-buyers?limit={}", limit),
    ];
    let mut bodies = api.get_json_all(&paths)?.into_iter();
    let mut next = || bodies.next().ok_or_else(|| anyhow!("missing analytics response"));
    let monthly: Vec<MonthlyStats> = serde_json::from_value(next()?)?;
    let products: Vec<ProductSalesStats> = serde_json::from_value(next()?)?;
    let buyers: Vec<TopBuyerStats> = serde_json::from_value(next()?)?;

    println!("Monthly");
    println!("{}", monthly_table(&monthly));
    println!("Product sales");
    println!("{}", products_table(&products));
    println!("Top receivables");
    println!("{}", top_buyers_table(&buyers));
    Ok(())
}

fn dashboard_table(d: &DashboardSummary) -> comfy_table::Table {
    pretty_table(
        &["", "Today", "All time"],
        vec![
            vec![
                "Purchases".into(),
                format_inr(d.today_purchases),
                format_inr(d.total_purchases),
            ],
            vec![
                "Sales".into(),
                format_inr(d.today_sales),
                format_inr(d.total_sales),
            ],
            vec![
                "Expenses".into(),
                format_inr(d.today_expenses),
                format_inr(d.total_expenses),
            ],
            vec!["Profit".into(), String::new(), format_inr(d.total_profit)],
            vec![
                "Receivable".into(),
                String::new(),
                signed_amount(d.total_receivable),
            ],
        ],
    )
}

fn monthly_table(items: &[MonthlyStats]) -> comfy_table::Table {
    let rows = items
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                format_inr(m.purchases),
                format_inr(m.sales),
                format_inr(m.expenses),
                format_inr(m.profit),
            ]
        })
        .collect();
    pretty_table(&["Month", "Purchases", "Sales", "Expenses", "Profit"], rows)
}

fn products_table(items: &[ProductSalesStats]) -> comfy_table::Table {
    let rows = items
        .iter()
        .map(|p| {
            vec![
                p.product_name.clone(),
                p.total_quantity.normalize().to_string(),
                format_inr(p.total_amount),
            ]
        })
        .collect();
    pretty_table(&["Product", "Quantity", "Amount"], rows)
}

fn top_buyers_table(items: &[TopBuyerStats]) -> comfy_table::Table {
    let rows = items
        .iter()
        .map(|b| vec![b.buyer_name.clone(), signed_amount(b.outstanding_amount)])
        .collect();
    pretty_table(&["Buyer", "Outstanding"], rows)
}

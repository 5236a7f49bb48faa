// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use khata::commands::{purchases, sales};
use khata::export::{write_csv, write_csv_file};
use khata::models::{Purchase, Sale};
use serde_json::json;
use tempfile::tempdir;

fn read_back(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_reader(bytes);
    let headers = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

#[test]
fn first_record_keys_become_the_header() {
    let mut buf = Vec::new();
    let n = write_csv(&[json!({"Date": "2024-01-01", "Amount": 100})], &mut buf).unwrap();
    assert_eq!(n, 1);
    let (headers, rows) = read_back(&buf);
    assert_eq!(headers, vec!["Date", "Amount"]);
    assert_eq!(rows, vec![vec!["2024-01-01", "100"]]);
}

#[test]
fn values_with_commas_and_quotes_survive() {
    let mut buf = Vec::new();
    write_csv(
        &[json!({"Notes": "Paid 5,000 \"cash\"", "Extra": null})],
        &mut buf,
    )
    .unwrap();
    let (_, rows) = read_back(&buf);
    assert_eq!(rows[0], vec!["Paid 5,000 \"cash\"", ""]);
}

#[test]
fn purchase_export_uses_report_columns() {
    let p: Purchase = serde_json::from_value(json!({
        "id": 1,
        "date": "2024-04-02",
        "seller_name": "Mohan",
        "seller_phone": null,
        "pickup_location": "Rajkot",
        "scrap_type": "Teak offcuts",
        "transport_service": null,
        "transport_cost": "150",
        "quantity": "12.500",
        "unit": "kg",
        "price_per_unit": "25.50",
        "total_purchase_cost": "468.75",
        "actual_paid_amount": null,
        "notes": "Urgent, same day",
        "created_at": "2024-04-02T10:00:00",
        "updated_at": null
    }))
    .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("purchases.csv");
    let n = write_csv_file(&purchases::export_rows(&[p]), &path).unwrap();
    assert_eq!(n, 1);

    let (headers, rows) = read_back(&std::fs::read(&path).unwrap());
    assert_eq!(
        headers,
        vec![
            "Date",
            "Seller Name",
            "Seller Phone",
            "Scrap Type",
            "Quantity",
            "Price per Unit",
            "Transport Cost",
            "Total Cost",
            "Notes"
        ]
    );
    assert_eq!(
        rows[0],
        vec![
            "02/04/2024",
            "Mohan",
            "",
            "Teak offcuts",
            "12.5 kg",
            "25.50",
            "150",
            "468.75",
            "Urgent, same day"
        ]
    );
}

#[test]
fn sales_export_derives_balance_due() {
    let s: Sale = serde_json::from_value(json!({
        "id": 9,
        "date": "2024-04-03",
        "buyer_id": 2,
        "payment_type": "Partial",
        "payment_received_now": "400",
        "total_amount": "1000",
        "notes": null,
        "created_at": "2024-04-03T09:00:00",
        "updated_at": null,
        "buyer": {
            "id": 2,
            "name": "Shah Furniture",
            "phone": null,
            "address": null,
            "notes": null,
            "opening_balance": "0",
            "created_at": "2024-01-01T00:00:00",
            "updated_at": null,
            "total_sales": "0",
            "total_payments": "0",
            "outstanding_balance": "0"
        }
    }))
    .unwrap();

    let mut buf = Vec::new();
    write_csv(&sales::export_rows(&[s]), &mut buf).unwrap();
    let (headers, rows) = read_back(&buf);
    assert_eq!(headers[5], "Balance");
    assert_eq!(
        rows[0],
        vec!["03/04/2024", "Shah Furniture", "Partial", "1000", "400", "600", ""]
    );
}

#[test]
fn nothing_to_export_leaves_an_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("expenses.csv");
    let rows: Vec<serde_json::Value> = Vec::new();
    assert_eq!(write_csv_file(&rows, &path).unwrap(), 0);
    assert!(std::fs::read(&path).unwrap().is_empty());
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use khata::cli;
use khata::commands::{buyers, expenses, products, purchases, sales};
use khata::models::PaymentType;
use rust_decimal::Decimal;
use serde_json::json;

fn sub(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["khata"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, group) = matches.subcommand().unwrap();
    let (_, leaf) = group.subcommand().unwrap();
    leaf.clone()
}

#[test]
fn sale_items_parse_with_default_unit() {
    let item = sales::parse_item("3:12.5:40").unwrap();
    assert_eq!(item.product_type_id, 3);
    assert_eq!(item.quantity, Decimal::new(125, 1));
    assert_eq!(item.price_per_unit, Decimal::new(40, 0));
    assert_eq!(item.unit, "kg");

    assert_eq!(sales::parse_item("3:2:100:sheet").unwrap().unit, "sheet");
    assert!(sales::parse_item("3:2").is_err());
    assert!(sales::parse_item("x:2:5").is_err());
}

#[test]
fn sale_drops_invalid_items_and_totals_the_rest() {
    let m = sub(&[
        "sales", "add", "--date", "2024-04-05", "--buyer", "2", "--payment-type", "partial",
        "--received", "500", "--item", "1:10:45", "--item", "2:0:30", "--item", "4:3:100:sheet",
    ]);
    let sale = sales::sale_from_args(&m).unwrap();
    assert_eq!(sale.date, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());
    assert_eq!(sale.payment_type, PaymentType::Partial);
    assert_eq!(sale.sale_items.len(), 2);
    assert_eq!(sales::grand_total(&sale.sale_items), Decimal::new(750, 0));
}

#[test]
fn sale_with_no_valid_item_is_rejected() {
    let m = sub(&["sales", "add", "--buyer", "2", "--item", "0:10:45"]);
    let err = sales::sale_from_args(&m).unwrap_err();
    assert_eq!(err.to_string(), "Please add at least one valid product");
}

#[test]
fn payment_requires_positive_amount() {
    let m = sub(&["buyers", "pay", "--id", "4", "--amount", "0"]);
    let err = buyers::payment_from_args(4, &m).unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid amount");

    let m = sub(&[
        "buyers", "pay", "--id", "4", "--amount", "1200.50", "--method", "UPI", "--date",
        "2024-04-06",
    ]);
    let p = buyers::payment_from_args(4, &m).unwrap();
    assert_eq!(p.amount, Decimal::new(120050, 2));
    assert_eq!(p.payment_method, "UPI");
    assert_eq!(p.buyer_id, 4);
}

#[test]
fn unknown_payment_method_is_a_usage_error() {
    let res = cli::build_cli().try_get_matches_from([
        "khata", "buyers", "pay", "--id", "4", "--amount", "10", "--method", "Barter",
    ]);
    assert!(res.is_err());
}

#[test]
fn buyer_update_sends_only_given_fields() {
    let m = sub(&[
        "buyers", "update", "--id", "3", "--phone", " 98765 43210 ", "--opening-balance", "-250",
    ]);
    let body = buyers::buyer_fields(&m).unwrap();
    assert_eq!(
        serde_json::Value::Object(body),
        json!({"phone": "98765 43210", "opening_balance": "-250"})
    );
}

#[test]
fn purchase_defaults_fill_unit_and_transport() {
    let m = sub(&[
        "purchases", "add", "--date", "2024-04-01", "--seller", "Mohan", "--scrap-type", "Teak",
        "--quantity", "10", "--price", "25",
    ]);
    let p = purchases::purchase_from_args(&m).unwrap();
    assert_eq!(p.unit, "kg");
    assert_eq!(p.transport_cost, Decimal::ZERO);
    assert!(p.actual_paid_amount.is_none());
    assert!(p.seller_phone.is_none());
}

#[test]
fn expense_category_must_be_known() {
    let m = sub(&["expenses", "add", "--category", "Labour", "--amount", "300"]);
    let e = expenses::expense_from_args(&m).unwrap();
    assert_eq!(e.category, "Labour");

    let res = cli::build_cli().try_get_matches_from([
        "khata", "expenses", "add", "--category", "Lunch", "--amount", "300",
    ]);
    assert!(res.is_err());
}

#[test]
fn buyer_add_builds_a_typed_body() {
    let m = sub(&[
        "buyers", "add", "--name", " Shah Furniture ", "--opening-balance", "-500",
    ]);
    let b = buyers::buyer_from_args(&m).unwrap();
    assert_eq!(b.name, "Shah Furniture");
    assert_eq!(b.opening_balance, Some(Decimal::new(-500, 0)));
    assert_eq!(
        serde_json::to_value(&b).unwrap(),
        json!({"name": "Shah Furniture", "opening_balance": "-500"})
    );
}

#[test]
fn purchase_update_sends_only_given_fields() {
    let m = sub(&[
        "purchases", "update", "--id", "5", "--price", "30", "--notes", "recounted",
    ]);
    let body = purchases::purchase_fields(&m).unwrap();
    assert_eq!(
        serde_json::Value::Object(body),
        json!({"price_per_unit": "30", "notes": "recounted"})
    );

    let m = sub(&["purchases", "update", "--id", "5"]);
    let err = purchases::purchase_fields(&m).unwrap_err();
    assert_eq!(err.to_string(), "Nothing to update");
}

#[test]
fn sale_update_replaces_items_and_checks_payment_type() {
    let m = sub(&[
        "sales", "update", "--id", "9", "--payment-type", "paid", "--item", "1:2:50",
    ]);
    let body = sales::sale_fields(&m).unwrap();
    assert_eq!(
        serde_json::Value::Object(body),
        json!({
            "payment_type": "Paid",
            "sale_items": [
                {"product_type_id": 1, "quantity": "2", "unit": "kg", "price_per_unit": "50"}
            ]
        })
    );

    let m = sub(&["sales", "update", "--id", "9", "--payment-type", "barter"]);
    assert!(sales::sale_fields(&m).is_err());

    let m = sub(&["sales", "update", "--id", "9", "--received", "250"]);
    let body = sales::sale_fields(&m).unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body["payment_received_now"], json!("250"));
}

#[test]
fn expense_update_validates_amount() {
    let m = sub(&["expenses", "update", "--id", "2", "--description", " diesel "]);
    let body = expenses::expense_fields(&m).unwrap();
    assert_eq!(serde_json::Value::Object(body), json!({"description": "diesel"}));

    let m = sub(&["expenses", "update", "--id", "2", "--amount", "0"]);
    let err = expenses::expense_fields(&m).unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid amount");

    let res = cli::build_cli().try_get_matches_from([
        "khata", "expenses", "update", "--id", "2", "--category", "Lunch",
    ]);
    assert!(res.is_err());
}

#[test]
fn product_update_renames() {
    let m = sub(&["products", "update", "--id", "3", "--name", "18mm Ply"]);
    let body = products::product_fields(&m).unwrap();
    assert_eq!(serde_json::Value::Object(body), json!({"name": "18mm Ply"}));
}

#[test]
fn purchases_and_expenses_can_be_shown_by_id() {
    let m = sub(&["purchases", "show", "--id", "3", "--json"]);
    assert_eq!(*m.get_one::<i64>("id").unwrap(), 3);
    assert!(m.get_flag("json"));

    let m = sub(&["expenses", "show", "--id", "4"]);
    assert_eq!(*m.get_one::<i64>("id").unwrap(), 4);
    assert!(cli::build_cli()
        .try_get_matches_from(["khata", "expenses", "show"])
        .is_err());
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    /// Negative means an advance held on the customer's behalf.
    pub opening_balance: Decimal,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub total_sales: Decimal,
    pub total_payments: Decimal,
    pub outstanding_balance: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerListItem {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub outstanding_balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Sale,
    Payment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Running balance as computed by the backend; filled client-side when absent.
    #[serde(default)]
    pub balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerLedger {
    pub buyer: Buyer,
    pub entries: Vec<LedgerEntry>,
    pub opening_balance: Decimal,
    #[serde(default)]
    pub closing_balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub date: NaiveDate,
    pub seller_name: String,
    pub seller_phone: Option<String>,
    pub pickup_location: Option<String>,
    pub scrap_type: String,
    pub transport_service: Option<String>,
    pub transport_cost: Decimal,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Decimal,
    pub total_purchase_cost: Decimal,
    pub actual_paid_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCreate {
    pub date: NaiveDate,
    pub seller_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    pub scrap_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_service: Option<String>,
    pub transport_cost: Decimal,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_paid_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Paid,
    Partial,
    Credit,
}

impl PaymentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Some(Self::Paid),
            "partial" => Some(Self::Partial),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Partial => "Partial",
            Self::Credit => "Credit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: i64,
    pub product_type_id: i64,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Decimal,
    pub total_price: Decimal,
    #[serde(default)]
    pub product_type: Option<ProductType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemCreate {
    pub product_type_id: i64,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub date: NaiveDate,
    pub buyer_id: i64,
    pub payment_type: PaymentType,
    pub payment_received_now: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub buyer: Buyer,
    #[serde(default)]
    pub sale_items: Vec<SaleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    pub date: NaiveDate,
    pub buyer_id: i64,
    pub payment_type: PaymentType,
    pub payment_received_now: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub sale_items: Vec<SaleItemCreate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub date: NaiveDate,
    pub buyer_id: i64,
    pub amount: Decimal,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub date: NaiveDate,
    pub buyer_id: i64,
    pub amount: Decimal,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub const PAYMENT_METHODS: [&str; 5] = ["Cash", "Bank Transfer", "UPI", "Cheque", "Other"];

pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Rent",
    "Electricity",
    "Water",
    "Labour",
    "Transport",
    "Tax",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub date: NaiveDate,
    pub category: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today_purchases: Decimal,
    pub today_sales: Decimal,
    pub today_expenses: Decimal,
    pub total_purchases: Decimal,
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub total_receivable: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    pub purchases: Decimal,
    pub sales: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSalesStats {
    pub product_name: String,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopBuyerStats {
    pub buyer_name: String,
    pub outstanding_amount: Decimal,
}

/// Optional `start_date`/`end_date` query pair shared by several endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
